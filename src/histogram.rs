use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::analysis::AgeHistogram;
use crate::chart::{
    draw_backdrop, draw_legend, draw_x_title, draw_y_axis, nice_tick_step, ChartColors,
    PAD_BOTTOM, PAD_LEFT, PAD_RIGHT, PAD_TOP,
};

/// Overlaid step histogram, one translucent series per sex.
#[derive(Debug, Clone)]
pub struct StepHistogram {
    pub hist: AgeHistogram,
    pub series_colors: Vec<Color>,
    pub title: String,
    pub colors: ChartColors,
}

/// Outline of a step series as (x, count) vertices: up the left edge of each
/// bucket, across its top, and back down to zero after the last one.
pub fn step_outline(counts: &[usize], lo: f64, hi: f64) -> Vec<(f64, usize)> {
    let n = counts.len();
    if n == 0 {
        return Vec::new();
    }
    let width = (hi - lo) / n as f64;
    let mut pts = Vec::with_capacity(2 * n + 2);
    pts.push((lo, 0));
    for (i, &count) in counts.iter().enumerate() {
        let left = lo + width * i as f64;
        pts.push((left, count));
        pts.push((left + width, count));
    }
    pts.push((hi, 0));
    pts
}

impl<Message: 'static> canvas::Program<Message> for StepHistogram {
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
        let chart_h = bounds.height - PAD_TOP - PAD_BOTTOM;
        if chart_w <= 0.0 || chart_h <= 0.0 {
            return vec![frame.into_geometry()];
        }

        draw_backdrop(&mut frame, bounds.size(), c, &self.title);

        let y_max = (self.hist.max_count() as f32 * 1.05).max(1.0);
        draw_y_axis(&mut frame, c, 0.0, y_max, chart_w, chart_h, "Count");

        let (lo, hi) = (self.hist.lo, self.hist.hi);
        let to_x = |age: f64| PAD_LEFT + ((age - lo) / (hi - lo)) as f32 * chart_w;
        let to_y = |count: usize| PAD_TOP + chart_h * (1.0 - count as f32 / y_max);

        // Age ticks
        let step = nice_tick_step((hi - lo) as f32, 11) as f64;
        let mut age = (lo / step).ceil() * step;
        while age <= hi + 1e-9 {
            let mut label = Text::from(format!("{age:.0}"));
            label.position = Point::new(to_x(age), PAD_TOP + chart_h + 6.0);
            label.color = c.label;
            label.size = 10.0.into();
            label.horizontal_alignment = iced::alignment::Horizontal::Center;
            frame.fill_text(label);
            age += step;
        }
        draw_x_title(&mut frame, c, "age", chart_w, bounds.height);

        let mut legend = Vec::with_capacity(self.hist.series.len());
        for (i, series) in self.hist.series.iter().enumerate() {
            let color = self.series_colors.get(i).copied().unwrap_or(c.text);
            let outline = step_outline(&series.counts, lo, hi);

            let mut builder = canvas::path::Builder::new();
            for (j, &(x, count)) in outline.iter().enumerate() {
                let p = Point::new(to_x(x), to_y(count));
                if j == 0 {
                    builder.move_to(p);
                } else {
                    builder.line_to(p);
                }
            }
            let path = builder.build();
            frame.fill(&path, Color::from_rgba(color.r, color.g, color.b, 0.4));
            frame.stroke(&path, Stroke::default().with_color(color).with_width(1.5));
            legend.push((series.sex.as_str(), color));
        }

        draw_legend(&mut frame, c, "sex", &legend, bounds.width - PAD_RIGHT + 14.0);

        if self.hist.out_of_range > 0 {
            let mut note = Text::from(format!("{} outside {lo:.0}–{hi:.0}", self.hist.out_of_range));
            note.position = Point::new(bounds.width - PAD_RIGHT + 14.0, PAD_TOP + chart_h - 14.0);
            note.color = c.label;
            note.size = 10.0.into();
            frame.fill_text(note);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_outline_shape() {
        let pts = step_outline(&[2, 5], 0.0, 10.0);
        assert_eq!(pts, vec![(0.0, 0), (0.0, 2), (5.0, 2), (5.0, 5), (10.0, 5), (10.0, 0)]);
    }

    #[test]
    fn test_step_outline_empty() {
        assert!(step_outline(&[], 15.0, 70.0).is_empty());
    }
}
