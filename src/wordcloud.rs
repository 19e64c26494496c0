//! Word-cloud layout and drawing.
//!
//! Words are placed largest first along an Archimedean spiral from the centre
//! of a fixed logical canvas; each word takes the first spot where its box
//! stays inside the canvas and clear of every word already placed. A word that
//! does not fit is retried smaller and dropped once it reaches the minimum
//! size. The canvas program scales the logical layout to its bounds.

use iced::mouse;
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::chart::ChartColors;

pub const LOGICAL_WIDTH: f32 = 800.0;
pub const LOGICAL_HEIGHT: f32 = 500.0;

const MIN_FONT: f32 = 10.0;
const SHRINK: f32 = 0.85;
/// Rough glyph advance as a fraction of the font size.
const CHAR_ASPECT: f32 = 0.6;
const LINE_HEIGHT: f32 = 1.15;
const SPIRAL_STEP: f32 = 0.1;
const SPIRAL_GROWTH: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: f32,
    /// Top-left corner of the word's box in logical coordinates.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlacedWord {
    fn overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        x < self.x + self.width && self.x < x + w && y < self.y + self.height && self.y < y + h
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudLayout {
    pub width: f32,
    pub height: f32,
    pub words: Vec<PlacedWord>,
}

fn box_size(word: &str, font_size: f32) -> (f32, f32) {
    let chars = word.chars().count().max(1) as f32;
    (chars * font_size * CHAR_ASPECT, font_size * LINE_HEIGHT)
}

/// Lay out the `max_words` most frequent words; zero counts are skipped.
/// Font size is proportional to count, the top word getting the largest.
pub fn layout(freqs: &[(String, usize)], max_words: usize, width: f32, height: f32) -> CloudLayout {
    let mut ranked: Vec<&(String, usize)> = freqs.iter().filter(|(_, n)| *n > 0).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(max_words);

    let mut cloud = CloudLayout {
        width,
        height,
        words: Vec::with_capacity(ranked.len()),
    };
    let Some(top) = ranked.first().map(|(_, n)| *n as f32) else {
        return cloud;
    };

    let max_font = height * 0.25;
    let max_radius = width.hypot(height) / 2.0;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let aspect = width / height;

    for (word, count) in ranked {
        let mut font_size = (max_font * *count as f32 / top).max(MIN_FONT);
        // Never start wider than the canvas
        let (w, _) = box_size(word, font_size);
        if w > width {
            font_size *= width / w;
        }

        let mut placed = None;
        while placed.is_none() && font_size >= MIN_FONT {
            let (w, h) = box_size(word, font_size);
            let mut t = 0.0f32;
            loop {
                let r = SPIRAL_GROWTH * t;
                if r > max_radius {
                    break;
                }
                let x = cx + r * aspect * t.cos() - w / 2.0;
                let y = cy + r * t.sin() - h / 2.0;
                let inside = x >= 0.0 && y >= 0.0 && x + w <= width && y + h <= height;
                if inside && !cloud.words.iter().any(|p| p.overlaps(x, y, w, h)) {
                    placed = Some((x, y, w, h));
                    break;
                }
                t += SPIRAL_STEP;
            }
            if placed.is_none() {
                font_size *= SHRINK;
            }
        }

        if let Some((x, y, w, h)) = placed {
            cloud.words.push(PlacedWord {
                word: word.clone(),
                count: *count,
                font_size,
                x,
                y,
                width: w,
                height: h,
            });
        }
    }
    cloud
}

// ─── CANVAS ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CloudState {
    hovered: Option<usize>,
}

/// Draws a [`CloudLayout`] scaled into the widget bounds.
#[derive(Debug, Clone)]
pub struct WordCloud {
    pub layout: CloudLayout,
    pub word_colors: Vec<Color>,
    pub title: String,
    pub colors: ChartColors,
}

const TITLE_BAND: f32 = 34.0;

impl WordCloud {
    /// Scale and offset mapping logical coordinates into `bounds`.
    fn transform(&self, bounds: Rectangle) -> (f32, Point) {
        let avail_w = bounds.width - 16.0;
        let avail_h = bounds.height - TITLE_BAND - 8.0;
        let scale = (avail_w / self.layout.width).min(avail_h / self.layout.height).max(0.0);
        let offset = Point::new(
            (bounds.width - self.layout.width * scale) / 2.0,
            TITLE_BAND + (avail_h - self.layout.height * scale) / 2.0,
        );
        (scale, offset)
    }
}

impl<Message: 'static> canvas::Program<Message> for WordCloud {
    type State = CloudState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let hovered = match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                cursor.position_in(bounds).and_then(|pos| {
                    let (scale, offset) = self.transform(bounds);
                    if scale <= 0.0 {
                        return None;
                    }
                    let logical = Point::new((pos.x - offset.x) / scale, (pos.y - offset.y) / scale);
                    self.layout.words.iter().position(|w| w.contains(logical))
                })
            }
            Event::Mouse(mouse::Event::CursorLeft) => None,
            _ => return (canvas::event::Status::Ignored, None),
        };
        state.hovered = hovered;
        (canvas::event::Status::Ignored, None)
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

        let bg = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&bg, c.bg);

        let mut title = Text::from(self.title.clone());
        title.position = Point::new(bounds.width / 2.0, 10.0);
        title.color = c.text;
        title.size = 14.0.into();
        title.horizontal_alignment = iced::alignment::Horizontal::Center;
        frame.fill_text(title);

        let (scale, offset) = self.transform(bounds);
        if scale <= 0.0 {
            return vec![frame.into_geometry()];
        }

        for (i, w) in self.layout.words.iter().enumerate() {
            let color = self.word_colors.get(i % self.word_colors.len().max(1)).copied().unwrap_or(c.text);
            let mut t = Text::from(w.word.clone());
            t.position = Point::new(
                offset.x + (w.x + w.width / 2.0) * scale,
                offset.y + (w.y + w.height / 2.0) * scale,
            );
            t.color = color;
            t.size = (w.font_size * scale).into();
            t.horizontal_alignment = iced::alignment::Horizontal::Center;
            t.vertical_alignment = iced::alignment::Vertical::Center;
            frame.fill_text(t);
        }

        if let Some(w) = state.hovered.and_then(|i| self.layout.words.get(i)) {
            let rect = Path::rectangle(
                Point::new(offset.x + w.x * scale, offset.y + w.y * scale),
                Size::new(w.width * scale, w.height * scale),
            );
            frame.stroke(&rect, Stroke::default().with_color(c.border).with_width(1.0));

            let tip = format!("{}: {}", w.word, w.count);
            let mut tt = Text::from(tip);
            tt.position = Point::new(offset.x + w.x * scale, offset.y + (w.y + w.height) * scale + 4.0);
            tt.color = c.text;
            tt.size = 11.0.into();
            frame.fill_text(tt);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(w, n)| (w.to_string(), *n)).collect()
    }

    #[test]
    fn test_layout_respects_max_words_and_skips_zero() {
        let f = freqs(&[("love", 40), ("fun", 30), ("kind", 0), ("honest", 5), ("loyal", 3)]);
        let cloud = layout(&f, 3, LOGICAL_WIDTH, LOGICAL_HEIGHT);
        let words: Vec<&str> = cloud.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["love", "fun", "honest"]);
    }

    #[test]
    fn test_layout_sizes_follow_frequency() {
        let f = freqs(&[("fun", 10), ("love", 20), ("kind", 5)]);
        let cloud = layout(&f, 11, LOGICAL_WIDTH, LOGICAL_HEIGHT);
        assert_eq!(cloud.words[0].word, "love");
        assert!(cloud.words[0].font_size > cloud.words[1].font_size);
        assert!(cloud.words[1].font_size > cloud.words[2].font_size);
    }

    #[test]
    fn test_layout_has_no_overlaps_and_stays_inside() {
        let f = freqs(&[
            ("kind", 120), ("funny", 90), ("intelligent", 80), ("casual", 60),
            ("hook", 50), ("love", 200), ("fun", 150), ("adventurous", 40),
            ("ambitious", 30), ("honest", 25), ("loyal", 20),
        ]);
        let cloud = layout(&f, 11, LOGICAL_WIDTH, LOGICAL_HEIGHT);
        assert!(!cloud.words.is_empty());
        for (i, a) in cloud.words.iter().enumerate() {
            assert!(a.x >= 0.0 && a.y >= 0.0);
            assert!(a.x + a.width <= LOGICAL_WIDTH + 1e-3);
            assert!(a.y + a.height <= LOGICAL_HEIGHT + 1e-3);
            for b in &cloud.words[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn test_layout_empty_when_nothing_counted() {
        let cloud = layout(&freqs(&[("kind", 0)]), 11, LOGICAL_WIDTH, LOGICAL_HEIGHT);
        assert!(cloud.words.is_empty());
        assert!(layout(&[], 11, LOGICAL_WIDTH, LOGICAL_HEIGHT).words.is_empty());
    }
}
