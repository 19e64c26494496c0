use iced::keyboard;
use iced::widget::canvas::Canvas;
use iced::widget::{button, column, container, row, scrollable, slider, text, text_input, Column, Row, Space};
use iced::{Alignment, Background, Border, Color, Element, Length, Shadow, Subscription, Theme, Vector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::{parse_word_list, Distribution};
use crate::bars::GroupedBarChart;
use crate::cache::RenderCache;
use crate::chart::{ChartColors, LineChart};
use crate::dataset::{Column as DataColumn, Dataset};
use crate::histogram::StepHistogram;
use crate::preferences::{Preferences, AGE_BINS_RANGE, MAX_WORDS_RANGE};
use crate::theme::{build_palette, AccentColor, Palette, ThemeVariant};
use crate::views::{compute, View, ViewOutput, ViewRequest};
use crate::wordcloud::WordCloud;

const MONO: iced::Font = iced::Font::MONOSPACE;
const CACHE_CAPACITY: usize = 32;

// ─── MESSAGE ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Message {
    ViewSelected(View),
    DistributionColumn(DataColumn),
    ActivityColumn(DataColumn),
    WordListEdited(String),
    WordListSubmitted,
    MaxWordsChanged(u8),
    AgeBinsChanged(u8),
    Reload,
    ToggleSettings,
    SetTheme(ThemeVariant),
    SetAccent(AccentColor),
    KeyPressed(keyboard::Key, keyboard::Modifiers),
}

/// Result of the last render: the computed view, or the reason it failed.
type Rendered = Result<Arc<ViewOutput>, String>;

// ─── APP STATE ──────────────────────────────────────────────────

pub struct Dashboard {
    archive_path: PathBuf,
    extract_dir: PathBuf,
    dataset: Result<Arc<Dataset>, String>,
    loaded_at: Option<chrono::DateTime<chrono::Local>>,
    cache: RenderCache<ViewRequest, Arc<ViewOutput>>,
    rendered: Option<Rendered>,
    // Selections
    view: View,
    distribution_column: DataColumn,
    activity_column: DataColumn,
    /// Text box contents; applied on submit.
    word_draft: String,
    word_list: String,
    max_words: u8,
    age_bins: u8,
    // Theme
    show_settings: bool,
    theme_variant: ThemeVariant,
    accent_color: AccentColor,
    pal: Palette,
}

impl Dashboard {
    pub fn new() -> Self {
        let prefs = Preferences::load();
        let mut dash = Self {
            archive_path: prefs.archive_path.clone(),
            extract_dir: prefs.extract_dir.clone(),
            dataset: Err(String::from("Dataset not loaded")),
            loaded_at: None,
            cache: RenderCache::new(CACHE_CAPACITY),
            rendered: None,
            view: prefs.view,
            distribution_column: prefs.distribution_column,
            activity_column: prefs.activity_column,
            word_draft: prefs.word_list.clone(),
            word_list: prefs.word_list,
            max_words: prefs.max_words,
            age_bins: prefs.age_bins,
            show_settings: false,
            theme_variant: prefs.theme,
            accent_color: prefs.accent,
            pal: build_palette(prefs.theme, prefs.accent),
        };
        dash.load_dataset();
        dash.render();
        dash
    }

    pub fn title(&self) -> String {
        format!("Profile Insights - {}", self.view.name())
    }

    pub fn theme(&self) -> Theme {
        if self.theme_variant.is_light() { Theme::Light } else { Theme::Dark }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, modifiers| Some(Message::KeyPressed(key, modifiers)))
    }

    /// Extract the archive and parse it. Any derived view is dropped.
    fn load_dataset(&mut self) {
        self.cache.clear();
        self.dataset = match Dataset::load(&self.archive_path, &self.extract_dir) {
            Ok(ds) => {
                self.loaded_at = Some(chrono::Local::now());
                Ok(Arc::new(ds))
            }
            Err(e) => {
                warn!(archive = %self.archive_path.display(), "failed to load dataset: {e}");
                self.loaded_at = None;
                Err(e.to_string())
            }
        };
    }

    fn request(&self) -> ViewRequest {
        match self.view {
            View::Distribution => ViewRequest::Distribution { column: self.distribution_column },
            View::Age => ViewRequest::Age { bins: self.age_bins },
            View::Intents => ViewRequest::Intents {
                words: parse_word_list(&self.word_list),
                max_words: self.max_words,
            },
            View::Activity => ViewRequest::Activity { group_by: self.activity_column },
        }
    }

    /// Recompute the selected view, reusing a cached result for an equal request.
    fn render(&mut self) {
        let Ok(ds) = &self.dataset else {
            self.rendered = None;
            return;
        };
        let request = self.request();
        if let Some(hit) = self.cache.get(&request) {
            debug!(view = ?request.view(), "render cache hit");
            self.rendered = Some(Ok(Arc::clone(hit)));
            return;
        }

        let started = Instant::now();
        let result = compute(ds, &request);
        debug!(
            view = ?request.view(),
            elapsed_us = started.elapsed().as_micros() as u64,
            ok = result.is_ok(),
            "view computed"
        );
        self.rendered = Some(match result {
            Ok(output) => {
                let output = Arc::new(output);
                self.cache.insert(request, Arc::clone(&output));
                Ok(output)
            }
            Err(e) => {
                warn!(view = ?request.view(), "view failed: {e}");
                Err(e.to_string())
            }
        });
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::ViewSelected(view) => {
                self.view = view;
                self.show_settings = false;
                self.render();
                self.save_prefs();
            }
            Message::DistributionColumn(col) => {
                self.distribution_column = col;
                self.render();
                self.save_prefs();
            }
            Message::ActivityColumn(col) => {
                self.activity_column = col;
                self.render();
                self.save_prefs();
            }
            Message::WordListEdited(s) => self.word_draft = s,
            Message::WordListSubmitted => {
                self.word_list = self.word_draft.clone();
                self.render();
                self.save_prefs();
            }
            Message::MaxWordsChanged(n) => {
                self.max_words = n;
                self.render();
                self.save_prefs();
            }
            Message::AgeBinsChanged(n) => {
                self.age_bins = n;
                self.render();
                self.save_prefs();
            }
            Message::Reload => {
                info!("reloading dataset");
                self.load_dataset();
                self.render();
            }
            Message::ToggleSettings => self.show_settings = !self.show_settings,
            Message::SetTheme(variant) => {
                self.theme_variant = variant;
                self.pal = build_palette(variant, self.accent_color);
                self.save_prefs();
            }
            Message::SetAccent(accent) => {
                self.accent_color = accent;
                self.pal = build_palette(self.theme_variant, accent);
                self.save_prefs();
            }
            Message::KeyPressed(key, modifiers) => {
                use keyboard::key::Named;
                match key {
                    // Ignore plain keys while typing into the word box
                    keyboard::Key::Character(ref c) if modifiers.control() => {
                        let view = match c.as_str() {
                            "1" => Some(View::Distribution),
                            "2" => Some(View::Age),
                            "3" => Some(View::Intents),
                            "4" => Some(View::Activity),
                            "r" => {
                                self.update(Message::Reload);
                                None
                            }
                            "," => {
                                self.show_settings = !self.show_settings;
                                None
                            }
                            _ => None,
                        };
                        if let Some(view) = view {
                            self.update(Message::ViewSelected(view));
                        }
                    }
                    keyboard::Key::Named(Named::Escape) if self.show_settings => {
                        self.show_settings = false;
                    }
                    _ => {}
                }
            }
        }
    }

    fn save_prefs(&self) {
        let prefs = Preferences {
            theme: self.theme_variant,
            accent: self.accent_color,
            archive_path: self.archive_path.clone(),
            extract_dir: self.extract_dir.clone(),
            view: self.view,
            distribution_column: self.distribution_column,
            activity_column: self.activity_column,
            word_list: self.word_list.clone(),
            max_words: self.max_words,
            age_bins: self.age_bins,
        };
        prefs.save();
    }

    fn chart_colors(&self) -> ChartColors {
        ChartColors {
            bg: self.pal.panel_bg,
            border: self.pal.border,
            grid: self.pal.grid,
            label: self.pal.label,
            text: self.pal.text,
        }
    }

    // ─── MAIN VIEW ──────────────────────────────────────────────

    pub fn view(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let accent = p.accent;
        let label_c = p.label;

        let status: String = match (&self.dataset, self.loaded_at) {
            (Ok(ds), Some(at)) => format!("{} profiles · loaded {}", ds.len(), at.format("%H:%M:%S")),
            (Ok(ds), None) => format!("{} profiles", ds.len()),
            (Err(_), _) => String::from("no dataset"),
        };

        let menu_bar = row![
            text("Data Visualization Final Project - OkCupid Users Insights Dashboard")
                .size(15)
                .color(p.text),
            Space::with_width(Length::Fill),
            text(status).size(11).font(MONO).color(label_c),
            Space::with_width(12),
            button(text("Reload").size(12).color(accent))
                .on_press(Message::Reload)
                .style(button::text)
                .padding([2, 6]),
            button(text(if self.show_settings { "Close" } else { "Settings" }).size(12).color(accent))
                .on_press(Message::ToggleSettings)
                .style(button::text)
                .padding([2, 6]),
        ]
        .align_y(Alignment::Center)
        .padding([6, 12]);

        let content: Element<Message> = if self.show_settings {
            self.view_settings()
        } else {
            self.view_page()
        };

        let sidebar_bg = p.sidebar_bg;
        let border_c = p.border;
        let mut nav: Vec<Element<Message>> = vec![
            text("Navigation").size(16).color(p.text).into(),
            Space::with_height(4).into(),
            text("Go to").size(11).color(label_c).into(),
            Space::with_height(6).into(),
        ];
        for &v in View::ALL {
            nav.push(nav_item(v, self.view, p));
        }
        let sidebar = container(Column::with_children(nav).spacing(2).padding(10))
            .width(220)
            .height(Length::Fill)
            .style(move |_: &Theme| container::Style {
                background: Some(Background::Color(sidebar_bg)),
                border: Border { color: border_c, width: 1.0, radius: 0.0.into() },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.12),
                    offset: Vector::new(2.0, 0.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            });

        let bg = p.bg;
        let main = column![
            panel_bg(menu_bar.into(), sidebar_bg, border_c),
            row![sidebar, container(content).width(Length::Fill).height(Length::Fill).padding(16)]
                .height(Length::Fill),
        ]
        .spacing(0);

        container(main)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_: &Theme| container::Style {
                background: Some(Background::Color(bg)),
                ..Default::default()
            })
            .into()
    }

    // ─── PAGES ──────────────────────────────────────────────────

    fn view_page(&self) -> Element<'_, Message> {
        let p = &self.pal;

        if let Err(e) = &self.dataset {
            return panel(
                column![
                    text("Could not load the dataset").size(14).color(p.red),
                    text(e.clone()).size(12).font(MONO).color(p.text),
                    text(format!(
                        "Archive: {}  ·  extract to: {}",
                        self.archive_path.display(),
                        self.extract_dir.display()
                    ))
                    .size(11)
                    .color(p.label),
                ]
                .spacing(8)
                .into(),
                p,
            );
        }

        let (header, controls): (String, Element<Message>) = match self.view {
            View::Distribution => (
                format!("Distribution of {}", self.distribution_column.title()),
                labeled(
                    "Select a Categorical Column",
                    option_buttons(DataColumn::DISTRIBUTION, self.distribution_column, Message::DistributionColumn, p),
                    p,
                ),
            ),
            View::Age => (
                String::from("Age Distribution"),
                labeled(
                    &format!("Buckets: {}", self.age_bins),
                    slider(AGE_BINS_RANGE.0..=AGE_BINS_RANGE.1, self.age_bins, Message::AgeBinsChanged)
                        .width(260)
                        .into(),
                    p,
                ),
            ),
            View::Intents => (
                String::from("User Intents"),
                column![
                    labeled(
                        "Words (comma-separated, Enter to apply)",
                        text_input("kind, funny, ...", &self.word_draft)
                            .on_input(Message::WordListEdited)
                            .on_submit(Message::WordListSubmitted)
                            .size(12)
                            .into(),
                        p,
                    ),
                    labeled(
                        &format!("Max words: {}", self.max_words),
                        slider(MAX_WORDS_RANGE.0..=MAX_WORDS_RANGE.1, self.max_words, Message::MaxWordsChanged)
                            .width(260)
                            .into(),
                        p,
                    ),
                ]
                .spacing(10)
                .into(),
            ),
            View::Activity => (
                String::from("User Activity Trends"),
                labeled(
                    "Color By",
                    option_buttons(DataColumn::ACTIVITY, self.activity_column, Message::ActivityColumn, p),
                    p,
                ),
            ),
        };

        let body: Element<Message> = match &self.rendered {
            None => notice("Nothing to show yet", p),
            Some(Err(e)) => notice(&format!("Could not render this view: {e}"), p),
            Some(Ok(output)) => self.view_output(output),
        };

        column![
            text(header).size(20).color(p.text),
            controls,
            body,
        ]
        .spacing(14)
        .height(Length::Fill)
        .into()
    }

    fn view_output(&self, output: &ViewOutput) -> Element<'_, Message> {
        let p = &self.pal;
        let colors = self.chart_colors();
        match output {
            ViewOutput::Distribution { column, result } => match result {
                Distribution::NoData => notice(&no_data_message(*column), p),
                Distribution::Bars(rows) => canvas(GroupedBarChart {
                    rows: rows.clone(),
                    title: format!("{} Distribution by Gender among OkCupid Users", column.title()),
                    x_title: column.title(),
                    colors,
                }),
            },
            ViewOutput::Age(None) => notice("No age values in the dataset", p),
            ViewOutput::Age(Some(hist)) => {
                let series_colors = hist
                    .series
                    .iter()
                    .enumerate()
                    .map(|(i, s)| p.sex_color(&s.sex, i))
                    .collect();
                canvas(StepHistogram {
                    hist: hist.clone(),
                    series_colors,
                    title: String::from("Age Distribution"),
                    colors,
                })
            }
            ViewOutput::Intents { frequencies, cloud } => {
                if frequencies.is_empty() {
                    notice("Enter at least one word", p)
                } else if cloud.words.is_empty() {
                    notice("None of the words occur in the profile texts", p)
                } else {
                    let word_colors = (0..cloud.words.len()).map(|i| p.series_color(i)).collect();
                    canvas(WordCloud {
                        layout: cloud.clone(),
                        word_colors,
                        title: String::from("Word Frequency in User Descriptions"),
                        colors,
                    })
                }
            }
            ViewOutput::Activity { group_by, activity } => {
                let series = activity
                    .groups
                    .iter()
                    .enumerate()
                    .map(|(i, (label, counts))| {
                        let color = if *group_by == DataColumn::Sex {
                            p.sex_color(label, i)
                        } else {
                            p.series_color(i)
                        };
                        (label.clone(), color, counts.iter().map(|&n| n as f32).collect())
                    })
                    .collect();
                canvas(LineChart {
                    hours: activity.hours.clone(),
                    series,
                    y_max: activity.max_count() as f32 * 1.05,
                    title: String::from("Number of Users by Hour of Last Online"),
                    x_title: String::from("Hour of Last Online"),
                    y_title: String::from("Number of Users"),
                    legend_title: group_by.title(),
                    colors,
                })
            }
        }
    }

    // ─── SETTINGS ───────────────────────────────────────────────

    fn view_settings(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let accent = p.accent;
        let label_c = p.label;

        let mut theme_btns: Vec<Element<Message>> = Vec::new();
        for &variant in ThemeVariant::ALL {
            let is_active = self.theme_variant == variant;
            theme_btns.push(
                button(text(variant.name()).size(11).color(if is_active { accent } else { label_c }))
                    .on_press(Message::SetTheme(variant))
                    .style(if is_active { button::primary } else { button::secondary })
                    .padding([4, 10])
                    .into(),
            );
        }

        let mut accent_btns: Vec<Element<Message>> = Vec::new();
        for &ac in AccentColor::ALL {
            let is_active = self.accent_color == ac;
            let ac_color = ac.color();
            let ring = if is_active { p.text } else { Color::TRANSPARENT };
            accent_btns.push(
                column![
                    button(Space::new(22, 22))
                        .on_press(Message::SetAccent(ac))
                        .padding(0)
                        .style(move |_: &Theme, _status| button::Style {
                            background: Some(Background::Color(ac_color)),
                            border: Border { color: ring, width: 2.0, radius: 12.0.into() },
                            ..Default::default()
                        }),
                    text(ac.name()).size(9).color(label_c),
                ]
                .align_x(Alignment::Center)
                .spacing(2)
                .into(),
            );
        }

        let data_info = column![
            info_row("Archive", self.archive_path.display(), p),
            info_row("Extracted to", self.extract_dir.display(), p),
            info_row(
                "Profiles",
                self.dataset.as_ref().map(|ds| ds.len().to_string()).unwrap_or_else(|_| "-".into()),
                p,
            ),
            info_row("Cached views", self.cache.len(), p),
        ]
        .spacing(4);

        scrollable(
            column![
                section_title("Theme", p),
                Row::with_children(theme_btns).spacing(4),
                section_title("Accent color", p),
                Row::with_children(accent_btns).spacing(8),
                section_title("Data", p),
                panel(data_info.into(), p),
                text("Ctrl+1..4 switch views · Ctrl+R reload · Ctrl+, settings").size(10).color(label_c),
            ]
            .spacing(10),
        )
        .into()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

// ─── WIDGET HELPERS ─────────────────────────────────────────────

/// Shown instead of the bar chart when one sex is absent for `column`.
pub fn no_data_message(column: DataColumn) -> String {
    format!("No data available for the selected column: {column}")
}

fn canvas<P>(program: P) -> Element<'static, Message>
where
    P: iced::widget::canvas::Program<Message> + 'static,
{
    Canvas::new(program)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn nav_item(target: View, current: View, p: &Palette) -> Element<'static, Message> {
    let is_active = target == current;
    let sidebar_bg = p.sidebar_bg;
    let accent = p.accent;
    // Slightly lighten sidebar_bg for active state
    let active_bg = Color::from_rgb(
        (sidebar_bg.r + 0.06).min(1.0),
        (sidebar_bg.g + 0.06).min(1.0),
        (sidebar_bg.b + 0.06).min(1.0),
    );
    let hover_bg = Color::from_rgb(
        (sidebar_bg.r + 0.03).min(1.0),
        (sidebar_bg.g + 0.03).min(1.0),
        (sidebar_bg.b + 0.03).min(1.0),
    );
    let text_c = p.text;
    let label_c = p.label;

    button(text(target.name()).size(12).color(if is_active { accent } else { label_c }))
        .on_press(Message::ViewSelected(target))
        .width(Length::Fill)
        .padding([8, 10])
        .style(move |_: &Theme, status| {
            let bg = match status {
                button::Status::Hovered if !is_active => hover_bg,
                _ if is_active => active_bg,
                _ => sidebar_bg,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: text_c,
                border: Border {
                    color: if is_active { accent } else { Color::TRANSPARENT },
                    width: if is_active { 2.0 } else { 0.0 },
                    radius: 6.0.into(),
                },
                ..Default::default()
            }
        })
        .into()
}

fn option_buttons(
    options: &[DataColumn],
    current: DataColumn,
    on_press: fn(DataColumn) -> Message,
    p: &Palette,
) -> Element<'static, Message> {
    let accent = p.accent;
    let label_c = p.label;
    let mut btns: Vec<Element<Message>> = Vec::new();
    for &col in options {
        let is_active = col == current;
        let btn = button(text(col.name()).size(11).font(MONO).color(if is_active { accent } else { label_c }))
            .on_press(on_press(col))
            .style(if is_active { button::primary } else { button::secondary })
            .padding([4, 10]);
        btns.push(btn.into());
    }
    Row::with_children(btns).spacing(4).into()
}

fn labeled<'a>(label: &str, control: Element<'a, Message>, p: &Palette) -> Element<'a, Message> {
    column![text(label.to_string()).size(11).color(p.label), control]
        .spacing(4)
        .into()
}

fn notice(message: &str, p: &Palette) -> Element<'static, Message> {
    panel(text(message.to_string()).size(13).color(p.text).into(), p)
}

fn info_row<'a>(label: impl ToString, value: impl ToString, p: &Palette) -> Element<'a, Message> {
    let l = format!("{}:", label.to_string());
    let v = value.to_string();
    row![
        text(l).size(11).color(p.label).width(120),
        text(v).size(11).font(MONO).color(p.text),
    ]
    .spacing(8)
    .into()
}

fn section_title(label: &str, p: &Palette) -> Element<'static, Message> {
    text(label.to_string()).size(12).font(MONO).color(p.accent).into()
}

fn panel<'a>(content: Element<'a, Message>, p: &Palette) -> Element<'a, Message> {
    let panel_bg = p.panel_bg;
    let border_c = p.border;
    container(content)
        .width(Length::Fill)
        .padding(10)
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(panel_bg)),
            border: Border {
                color: border_c,
                width: 1.0,
                radius: 8.0.into(),
            },
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.15),
                offset: Vector::new(0.0, 2.0),
                blur_radius: 8.0,
            },
            ..Default::default()
        })
        .into()
}

fn panel_bg<'a>(content: Element<'a, Message>, bg: Color, border_c: Color) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(bg)),
            border: Border {
                color: border_c,
                width: 0.0,
                radius: 0.0.into(),
            },
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_message_names_column() {
        assert_eq!(
            no_data_message(DataColumn::Drugs),
            "No data available for the selected column: drugs"
        );
        assert_eq!(
            no_data_message(DataColumn::Orientation),
            "No data available for the selected column: orientation"
        );
    }
}
