use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Text};
use iced::{Point, Rectangle, Renderer, Size, Theme};

use crate::analysis::CategoryCounts;
use crate::chart::{
    draw_backdrop, draw_legend, draw_x_title, draw_y_axis, ChartColors, PAD_BOTTOM, PAD_LEFT,
    PAD_RIGHT, PAD_TOP,
};
use crate::theme::{FEMALE_COLOR, MALE_COLOR};

/// Fraction of a category slot taken by each of the two bars.
const BAR_WIDTH: f32 = 0.35;

/// Male/female bar pair per category, annotated with count and row share.
#[derive(Debug, Clone)]
pub struct GroupedBarChart {
    pub rows: Vec<CategoryCounts>,
    pub title: String,
    pub x_title: String,
    pub colors: ChartColors,
}

/// Annotation drawn above one bar.
pub fn bar_label(count: usize, pct: f64) -> String {
    format!("{count} ({pct:.1}%)")
}

impl<Message: 'static> canvas::Program<Message> for GroupedBarChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let c = &self.colors;

        let chart_w = bounds.width - PAD_LEFT - PAD_RIGHT;
        let chart_h = bounds.height - PAD_TOP - PAD_BOTTOM - 16.0;
        if chart_w <= 0.0 || chart_h <= 0.0 || self.rows.is_empty() {
            return vec![frame.into_geometry()];
        }

        draw_backdrop(&mut frame, bounds.size(), c, &self.title);

        let max = self
            .rows
            .iter()
            .map(|r| r.male.max(r.female))
            .max()
            .unwrap_or(0) as f32;
        // Headroom for the annotations
        let y_max = (max * 1.12).max(1.0);
        draw_y_axis(&mut frame, c, 0.0, y_max, chart_w, chart_h, "Number of Users");

        let slot = chart_w / self.rows.len() as f32;
        let bar_w = slot * BAR_WIDTH;
        let base_y = PAD_TOP + chart_h;

        for (i, row) in self.rows.iter().enumerate() {
            let slot_x = PAD_LEFT + slot * i as f32 + (slot - 2.0 * bar_w) / 2.0;
            let bars = [
                (row.male, row.male_pct(), MALE_COLOR, slot_x),
                (row.female, row.female_pct(), FEMALE_COLOR, slot_x + bar_w),
            ];
            for (count, pct, color, x) in bars {
                let h = chart_h * count as f32 / y_max;
                let rect = Path::rectangle(Point::new(x, base_y - h), Size::new(bar_w, h));
                frame.fill(&rect, color);

                let mut ann = Text::from(bar_label(count, pct));
                ann.position = Point::new(x + bar_w / 2.0, base_y - h - 14.0);
                ann.color = c.text;
                ann.size = 10.0.into();
                ann.horizontal_alignment = iced::alignment::Horizontal::Center;
                frame.fill_text(ann);
            }

            let mut label = Text::from(truncate(&row.category, (slot / 6.5) as usize));
            label.position = Point::new(slot_x + bar_w, base_y + 6.0);
            label.color = c.label;
            label.size = 11.0.into();
            label.horizontal_alignment = iced::alignment::Horizontal::Center;
            frame.fill_text(label);
        }

        draw_x_title(&mut frame, c, &self.x_title, chart_w, bounds.height);
        draw_legend(
            &mut frame,
            c,
            "",
            &[("Male", MALE_COLOR), ("Female", FEMALE_COLOR)],
            bounds.width - PAD_RIGHT + 14.0,
        );

        vec![frame.into_geometry()]
    }
}

/// Shorten a category label to `max_chars`, marking the cut with an ellipsis.
fn truncate(label: &str, max_chars: usize) -> String {
    let max_chars = max_chars.max(4);
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max_chars - 1).collect();
        s.push('…');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_label_format() {
        assert_eq!(bar_label(12, 57.14285), "12 (57.1%)");
        assert_eq!(bar_label(0, 0.0), "0 (0.0%)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("socially", 20), "socially");
        assert_eq!(truncate("desperately", 6), "despe…");
    }
}
