//! Interactive dashboard over a dating-profile dataset.
//!
//! The dataset ships as a zip archive holding one CSV. It is extracted and
//! parsed once, then four views are derived from it: categorical
//! distributions split by sex, an age histogram, word frequencies across the
//! free-text essays, and activity by hour of last login.

pub mod analysis;
pub mod bars;
pub mod cache;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod histogram;
pub mod preferences;
pub mod theme;
pub mod ui;
pub mod views;
pub mod wordcloud;
