use iced::mouse;
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::analysis::hour_label;

/// Hover state: stores the snapped data-point index (not raw pixel).
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    /// Index of the hovered data point, or None if not hovering.
    pub hover_idx: Option<usize>,
}

/// Colors every chart needs from the active palette.
#[derive(Debug, Clone, Copy)]
pub struct ChartColors {
    pub bg: Color,
    pub border: Color,
    pub grid: Color,
    pub label: Color,
    pub text: Color,
}

pub(crate) const PAD_LEFT: f32 = 52.0;
pub(crate) const PAD_RIGHT: f32 = 150.0;
pub(crate) const PAD_TOP: f32 = 30.0;
pub(crate) const PAD_BOTTOM: f32 = 42.0;

/// Users by hour of last online: one line per group value, with point markers.
#[derive(Debug, Clone)]
pub struct LineChart {
    pub hours: Vec<u32>,
    pub series: Vec<(String, Color, Vec<f32>)>,
    pub y_max: f32,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub legend_title: String,
    pub colors: ChartColors,
}

/// Last hour of the day; the x axis always spans `0..=LAST_HOUR`.
const LAST_HOUR: f32 = 23.0;

/// Horizontal position of `hour` on a chart `chart_w` wide.
pub fn hour_x(hour: u32, chart_w: f32) -> f32 {
    PAD_LEFT + (hour as f32 / LAST_HOUR).min(1.0) * chart_w
}

/// Index into `hours` of the point closest to pixel `x`.
pub fn nearest_hour_idx(hours: &[u32], x: f32, chart_w: f32) -> Option<usize> {
    hours
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (hour_x(**a, chart_w) - x).abs();
            let db = (hour_x(**b, chart_w) - x).abs();
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
}

impl LineChart {
    fn x_at(&self, i: usize, chart_w: f32) -> f32 {
        self.hours.get(i).map_or(PAD_LEFT, |&h| hour_x(h, chart_w))
    }
}

impl<Message: 'static> canvas::Program<Message> for LineChart {
    type State = ChartState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let chart_w = bounds.width - PAD_LEFT - PAD_RIGHT;

        let new_idx = match &event {
            Event::Mouse(iced::mouse::Event::CursorMoved { .. }) => {
                match cursor.position_in(bounds) {
                    Some(pos) if chart_w > 0.0 && pos.x >= PAD_LEFT && pos.x <= PAD_LEFT + chart_w => {
                        nearest_hour_idx(&self.hours, pos.x, chart_w)
                    }
                    _ => None,
                }
            }
            Event::Mouse(iced::mouse::Event::CursorLeft) => None,
            _ => return (canvas::event::Status::Ignored, None),
        };

        if new_idx != state.hover_idx {
            state.hover_idx = new_idx;
        }
        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        state: &Self::State,
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

        let y_max = self.y_max.max(1.0);
        draw_y_axis(&mut frame, c, 0.0, y_max, chart_w, chart_h, &self.y_title);

        // X ticks: one per hour present
        for (i, &hour) in self.hours.iter().enumerate() {
            let x = self.x_at(i, chart_w);
            let mut label = Text::from(hour_label(hour));
            label.position = Point::new(x, PAD_TOP + chart_h + 6.0);
            label.color = c.label;
            label.size = 11.0.into();
            label.horizontal_alignment = iced::alignment::Horizontal::Center;
            frame.fill_text(label);
        }
        draw_x_title(&mut frame, c, &self.x_title, chart_w, bounds.height);

        let y_of = |val: f32| PAD_TOP + chart_h * (1.0 - val / y_max);

        for (_label, color, data) in &self.series {
            let mut builder = canvas::path::Builder::new();
            for (i, &val) in data.iter().enumerate() {
                let p = Point::new(self.x_at(i, chart_w), y_of(val));
                if i == 0 {
                    builder.move_to(p);
                } else {
                    builder.line_to(p);
                }
            }
            let path = builder.build();
            let glow_color = Color::from_rgba(color.r, color.g, color.b, 0.2);
            frame.stroke(&path, Stroke::default().with_color(glow_color).with_width(4.0));
            frame.stroke(&path, Stroke::default().with_color(*color).with_width(2.0));

            // Point markers
            for (i, &val) in data.iter().enumerate() {
                let dot = Path::circle(Point::new(self.x_at(i, chart_w), y_of(val)), 3.0);
                frame.fill(&dot, *color);
            }
        }

        // Hover: crosshair at snapped hour and one tooltip per series
        if let Some(idx) = state.hover_idx.filter(|&i| i < self.hours.len()) {
            let snap_x = self.x_at(idx, chart_w);
            let crosshair = Path::line(Point::new(snap_x, PAD_TOP), Point::new(snap_x, PAD_TOP + chart_h));
            frame.stroke(
                &crosshair,
                Stroke::default()
                    .with_color(Color::from_rgba(c.text.r, c.text.g, c.text.b, 0.35))
                    .with_width(1.0),
            );

            let mut tooltip_y = PAD_TOP + 4.0;
            for (label, color, data) in &self.series {
                let Some(&val) = data.get(idx) else { continue };
                let ring = Path::circle(Point::new(snap_x, y_of(val)), 5.0);
                frame.stroke(&ring, Stroke::default().with_color(c.text).with_width(1.2));

                let tooltip_str = format!("{} {}: {:.0}", hour_label(self.hours[idx]), label, val);
                let text_w = tooltip_str.len() as f32 * 6.6 + 12.0;
                let tx = (snap_x + 12.0).min(PAD_LEFT + chart_w - text_w);
                let box_path = Path::rectangle(Point::new(tx - 4.0, tooltip_y - 2.0), Size::new(text_w, 18.0));
                frame.fill(&box_path, Color::from_rgba(c.bg.r, c.bg.g, c.bg.b, 0.95));
                frame.stroke(
                    &box_path,
                    Stroke::default()
                        .with_color(Color::from_rgba(color.r, color.g, color.b, 0.4))
                        .with_width(0.8),
                );
                let mut tt = Text::from(tooltip_str);
                tt.position = Point::new(tx, tooltip_y);
                tt.color = *color;
                tt.size = 11.0.into();
                frame.fill_text(tt);
                tooltip_y += 20.0;
            }
        }

        // Legend outside the plot, upper right
        let legend: Vec<(&str, Color)> = self.series.iter().map(|(l, col, _)| (l.as_str(), *col)).collect();
        draw_legend(&mut frame, c, &self.legend_title, &legend, bounds.width - PAD_RIGHT + 14.0);

        vec![frame.into_geometry()]
    }
}

// ─── SHARED DRAWING HELPERS ─────────────────────────────────────

pub(crate) fn draw_backdrop(frame: &mut Frame, size: Size, c: &ChartColors, title: &str) {
    let bg = Path::rectangle(Point::ORIGIN, size);
    frame.fill(&bg, c.bg);

    let border = Path::rectangle(Point::new(0.5, 0.5), Size::new(size.width - 1.0, size.height - 1.0));
    frame.stroke(&border, Stroke::default().with_color(c.border).with_width(0.5));

    let mut title_text = Text::from(title.to_string());
    title_text.position = Point::new(size.width / 2.0, 8.0);
    title_text.color = c.text;
    title_text.size = 14.0.into();
    title_text.horizontal_alignment = iced::alignment::Horizontal::Center;
    frame.fill_text(title_text);
}

/// Horizontal grid lines and labels at nice round values of `[y_min, y_max]`.
pub(crate) fn draw_y_axis(
    frame: &mut Frame,
    c: &ChartColors,
    y_min: f32,
    y_max: f32,
    chart_w: f32,
    chart_h: f32,
    y_title: &str,
) {
    let y_range = y_max - y_min;
    if y_range > 0.0 {
        let step = nice_tick_step(y_range, 8);
        let mut val = (y_min / step).ceil() * step;
        while val <= y_max + step * 0.001 {
            let y = PAD_TOP + chart_h * (1.0 - (val - y_min) / y_range);
            let grid = Path::line(Point::new(PAD_LEFT, y), Point::new(PAD_LEFT + chart_w, y));
            frame.stroke(&grid, Stroke::default().with_color(c.grid).with_width(1.0));

            let label_str = if step >= 1.0 { format!("{val:.0}") } else { format!("{val:.1}") };
            let mut label = Text::from(label_str);
            label.position = Point::new(PAD_LEFT - 6.0, y - 6.0);
            label.color = c.label;
            label.size = 10.0.into();
            label.horizontal_alignment = iced::alignment::Horizontal::Right;
            frame.fill_text(label);

            val += step;
        }
    }

    let axis = Path::line(Point::new(PAD_LEFT, PAD_TOP), Point::new(PAD_LEFT, PAD_TOP + chart_h));
    frame.stroke(&axis, Stroke::default().with_color(c.border).with_width(1.0));

    let mut title = Text::from(y_title.to_string());
    title.position = Point::new(6.0, PAD_TOP - 20.0);
    title.color = c.label;
    title.size = 11.0.into();
    frame.fill_text(title);
}

pub(crate) fn draw_x_title(frame: &mut Frame, c: &ChartColors, x_title: &str, chart_w: f32, height: f32) {
    let mut title = Text::from(x_title.to_string());
    title.position = Point::new(PAD_LEFT + chart_w / 2.0, height - 18.0);
    title.color = c.label;
    title.size = 11.0.into();
    title.horizontal_alignment = iced::alignment::Horizontal::Center;
    frame.fill_text(title);
}

pub(crate) fn draw_legend(frame: &mut Frame, c: &ChartColors, title: &str, entries: &[(&str, Color)], x: f32) {
    let mut y = PAD_TOP;
    if !title.is_empty() {
        let mut t = Text::from(title.to_string());
        t.position = Point::new(x, y);
        t.color = c.text;
        t.size = 11.0.into();
        frame.fill_text(t);
        y += 18.0;
    }
    for (label, color) in entries {
        let swatch = Path::rectangle(Point::new(x, y + 2.0), Size::new(10.0, 10.0));
        frame.fill(&swatch, *color);
        let mut lt = Text::from(label.to_string());
        lt.position = Point::new(x + 16.0, y);
        lt.color = c.label;
        lt.size = 11.0.into();
        frame.fill_text(lt);
        y += 16.0;
    }
}

/// Pick a "nice" tick step (1, 2, 5, 10, 20, 50, …) so that the range
/// is divided into at most `max_ticks` intervals.
pub fn nice_tick_step(range: f32, max_ticks: usize) -> f32 {
    let rough = range / max_ticks as f32;
    let mag = 10f32.powf(rough.log10().floor());
    let norm = rough / mag;
    let nice = if norm <= 1.0 { 1.0 } else if norm <= 2.0 { 2.0 } else if norm <= 5.0 { 5.0 } else { 10.0 };
    (nice * mag).max(f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_tick_step() {
        assert_eq!(nice_tick_step(100.0, 10), 10.0);
        assert_eq!(nice_tick_step(37.0, 8), 5.0);
        assert_eq!(nice_tick_step(8.0, 8), 1.0);
    }

    #[test]
    fn test_hours_placed_by_value() {
        let w = 230.0;
        assert_eq!(hour_x(0, w), PAD_LEFT);
        assert_eq!(hour_x(23, w), PAD_LEFT + w);
        // 0 -> 13 spans more than 13 -> 23
        let gap_a = hour_x(13, w) - hour_x(0, w);
        let gap_b = hour_x(23, w) - hour_x(13, w);
        assert!((gap_a - 130.0).abs() < 1e-3);
        assert!((gap_b - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_hover_snaps_to_nearest_hour() {
        let w = 230.0;
        let hours = [0, 13, 23];
        assert_eq!(nearest_hour_idx(&hours, PAD_LEFT + 10.0, w), Some(0));
        assert_eq!(nearest_hour_idx(&hours, PAD_LEFT + 120.0, w), Some(1));
        assert_eq!(nearest_hour_idx(&hours, PAD_LEFT + 200.0, w), Some(2));
        assert_eq!(nearest_hour_idx(&[], PAD_LEFT, w), None);
    }
}
