//! Derived views over a [`Dataset`]. Everything here is a pure function of the
//! dataset and the view options; nothing is cached at this level.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::{Column, Dataset, Profile};
use crate::error::{DataError, Result};

pub const MALE: &str = "m";
pub const FEMALE: &str = "f";

/// Fixed display range of the age histogram.
pub const AGE_RANGE: (f64, f64) = (15.0, 70.0);
pub const DEFAULT_AGE_BINS: u8 = 40;

pub const DEFAULT_WORDS: &[&str] = &[
    "kind", "funny", "intelligent", "casual", "hook", "love",
    "fun", "adventurous", "ambitious", "honest", "loyal",
];
pub const DEFAULT_MAX_WORDS: u8 = 11;

/// Text a missing essay contributes to the corpus.
const MISSING_TEXT: &str = "nan";

// ─── CATEGORICAL DISTRIBUTION ───────────────────────────────────

/// Counts of one category value split by sex.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCounts {
    pub category: String,
    pub male: usize,
    pub female: usize,
    /// Sum over every sex value present, not just `m` and `f`.
    pub total: usize,
}

impl CategoryCounts {
    pub fn male_pct(&self) -> f64 {
        percent(self.male, self.total)
    }

    pub fn female_pct(&self) -> f64 {
        percent(self.female, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    /// One entry per category, sorted by category value.
    Bars(Vec<CategoryCounts>),
    /// The grouped table lacks an `m` or an `f` column.
    NoData,
}

/// Count records per (category value, sex). Records missing either key are
/// left out.
pub fn grouped_counts(ds: &Dataset, column: Column) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut table: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for p in ds.profiles() {
        if let (Some(cat), Some(sex)) = (p.value(column), p.sex.as_deref()) {
            *table
                .entry(cat.to_string())
                .or_default()
                .entry(sex.to_string())
                .or_insert(0) += 1;
        }
    }
    table
}

pub fn categorical_distribution(ds: &Dataset, column: Column) -> Distribution {
    let table = grouped_counts(ds, column);
    let sexes: BTreeSet<&str> = table
        .values()
        .flat_map(|by_sex| by_sex.keys().map(String::as_str))
        .collect();
    if !sexes.contains(MALE) || !sexes.contains(FEMALE) {
        return Distribution::NoData;
    }

    let rows = table
        .iter()
        .map(|(category, by_sex)| CategoryCounts {
            category: category.clone(),
            male: by_sex.get(MALE).copied().unwrap_or(0),
            female: by_sex.get(FEMALE).copied().unwrap_or(0),
            total: by_sex.values().sum(),
        })
        .collect();
    Distribution::Bars(rows)
}

// ─── AGE DISTRIBUTION ───────────────────────────────────────────

pub fn mean_age(ds: &Dataset) -> Option<f64> {
    let (sum, n) = ds
        .profiles()
        .iter()
        .filter_map(|p| p.age)
        .fold((0.0, 0usize), |(s, n), a| (s + a, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Ages with missing values replaced by the mean age, in dataset order.
/// `None` when no record has an age.
pub fn impute_ages(ds: &Dataset) -> Option<Vec<f64>> {
    let mean = mean_age(ds)?;
    Some(ds.profiles().iter().map(|p| p.age.unwrap_or(mean)).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeSeries {
    pub sex: String,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeHistogram {
    pub lo: f64,
    pub hi: f64,
    pub series: Vec<AgeSeries>,
    /// Imputed ages that fall outside `[lo, hi]` and are not drawn.
    pub out_of_range: usize,
}

impl AgeHistogram {
    pub fn bins(&self) -> usize {
        self.series.first().map_or(0, |s| s.counts.len())
    }

    pub fn max_count(&self) -> usize {
        self.series
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

fn bin_index(age: f64, lo: f64, hi: f64, bins: usize) -> Option<usize> {
    if !(lo..=hi).contains(&age) {
        return None;
    }
    let width = (hi - lo) / bins as f64;
    Some((((age - lo) / width) as usize).min(bins - 1))
}

/// One step series per sex over `bins` equal buckets of [`AGE_RANGE`].
pub fn age_histogram(ds: &Dataset, bins: usize) -> Option<AgeHistogram> {
    let ages = impute_ages(ds)?;
    let bins = bins.max(1);
    let (lo, hi) = AGE_RANGE;

    let mut by_sex: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut out_of_range = 0;
    for (profile, &age) in ds.profiles().iter().zip(&ages) {
        let Some(sex) = profile.sex.as_deref() else { continue };
        let counts = by_sex.entry(sex).or_insert_with(|| vec![0; bins]);
        match bin_index(age, lo, hi, bins) {
            Some(i) => counts[i] += 1,
            None => out_of_range += 1,
        }
    }

    Some(AgeHistogram {
        lo,
        hi,
        series: by_sex
            .into_iter()
            .map(|(sex, counts)| AgeSeries { sex: sex.to_string(), counts })
            .collect(),
        out_of_range,
    })
}

// ─── USER INTENTS ───────────────────────────────────────────────

/// Split a comma-separated word list, trimming blanks and dropping empty and
/// repeated entries.
pub fn parse_word_list(input: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    input
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty() && seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn default_word_list() -> String {
    DEFAULT_WORDS.join(", ")
}

/// The ten essays of one record joined by single spaces.
pub fn profile_text(p: &Profile) -> String {
    p.essays
        .iter()
        .map(|e| e.as_deref().unwrap_or(MISSING_TEXT))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every profile text joined by single spaces.
pub fn corpus(ds: &Dataset) -> String {
    ds.profiles()
        .iter()
        .map(profile_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-sensitive, non-overlapping substring count. `kind` matches inside
/// `kindness`.
pub fn count_occurrences(corpus: &str, word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    corpus.matches(word).count()
}

pub fn word_frequencies(corpus: &str, words: &[String]) -> Vec<(String, usize)> {
    words
        .iter()
        .map(|w| (w.clone(), count_occurrences(corpus, w)))
        .collect()
}

// ─── USER ACTIVITY ──────────────────────────────────────────────

/// Hour of day from a `YYYY-MM-DD-HH[-MM]` stamp: the fourth hyphen field.
/// `None` when the field is absent or not an integer.
pub fn parse_hour(last_online: &str) -> Option<u32> {
    let field = last_online.split('-').nth(3)?;
    let field = if field == "00" { "0" } else { field };
    field.parse().ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyActivity {
    /// Hours that occur in the data, ascending.
    pub hours: Vec<u32>,
    /// One series per group value, aligned with `hours`.
    pub groups: Vec<(String, Vec<usize>)>,
}

impl HourlyActivity {
    pub fn max_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|(_, c)| c.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Count records per (hour, group value). A single malformed `last_online`
/// fails the whole computation.
pub fn hourly_activity(ds: &Dataset, group_by: Column) -> Result<HourlyActivity> {
    let hours: Vec<u32> = ds
        .profiles()
        .iter()
        .enumerate()
        .map(|(row, p)| {
            parse_hour(&p.last_online).ok_or_else(|| DataError::MalformedLastOnline {
                row,
                value: p.last_online.clone(),
            })
        })
        .collect::<Result<_>>()?;

    let mut table: BTreeMap<&str, BTreeMap<u32, usize>> = BTreeMap::new();
    let mut seen_hours = BTreeSet::new();
    for (p, &hour) in ds.profiles().iter().zip(&hours) {
        if let Some(group) = p.value(group_by) {
            *table.entry(group).or_default().entry(hour).or_insert(0) += 1;
            seen_hours.insert(hour);
        }
    }

    let hours: Vec<u32> = seen_hours.into_iter().collect();
    let groups = table
        .into_iter()
        .map(|(group, by_hour)| {
            let counts = hours
                .iter()
                .map(|h| by_hour.get(h).copied().unwrap_or(0))
                .collect();
            (group.to_string(), counts)
        })
        .collect();
    Ok(HourlyActivity { hours, groups })
}

/// Axis label for an hour, zero-padded below ten.
pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(sex: &str, orientation: &str) -> Profile {
        Profile {
            sex: Some(sex.into()),
            orientation: Some(orientation.into()),
            last_online: "2012-06-28-20-30".into(),
            ..Default::default()
        }
    }

    fn aged(sex: &str, age: Option<f64>) -> Profile {
        Profile {
            age,
            ..profile(sex, "straight")
        }
    }

    #[test]
    fn test_four_records_split_evenly() {
        let ds = Dataset::new(vec![
            profile("m", "straight"),
            profile("f", "straight"),
            profile("m", "gay"),
            profile("f", "gay"),
        ]);
        let Distribution::Bars(rows) = categorical_distribution(&ds, Column::Orientation) else {
            panic!("expected bars");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "gay");
        assert_eq!(rows[1].category, "straight");
        for row in &rows {
            assert_eq!((row.male, row.female), (1, 1));
            assert!((row.male_pct() - 50.0).abs() < 1e-9);
            assert!((row.female_pct() - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let ds = Dataset::new(vec![
            profile("m", "straight"),
            profile("m", "straight"),
            profile("f", "straight"),
            profile("m", "bisexual"),
            profile("f", "bisexual"),
            profile("f", "bisexual"),
            profile("f", "bisexual"),
        ]);
        let Distribution::Bars(rows) = categorical_distribution(&ds, Column::Orientation) else {
            panic!("expected bars");
        };
        for row in rows {
            assert!((row.male_pct() + row.female_pct() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_sex_column_yields_no_data() {
        let ds = Dataset::new(vec![profile("m", "straight"), profile("m", "gay")]);
        assert_eq!(categorical_distribution(&ds, Column::Orientation), Distribution::NoData);
        assert_eq!(categorical_distribution(&Dataset::default(), Column::Drinks), Distribution::NoData);
    }

    #[test]
    fn test_category_without_one_sex_gets_zero() {
        let ds = Dataset::new(vec![
            profile("m", "straight"),
            profile("f", "straight"),
            profile("m", "gay"),
        ]);
        let Distribution::Bars(rows) = categorical_distribution(&ds, Column::Orientation) else {
            panic!("expected bars");
        };
        assert_eq!(rows[0].female, 0);
        assert!((rows[0].male_pct() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_imputation_fills_and_preserves_mean() {
        let ds = Dataset::new(vec![
            aged("m", Some(20.0)),
            aged("f", None),
            aged("f", Some(40.0)),
            aged("m", None),
        ]);
        let before = mean_age(&ds).unwrap();
        let ages = impute_ages(&ds).unwrap();
        assert_eq!(ages.len(), 4);
        assert!(ages.iter().all(|a| a.is_finite()));
        let after = ages.iter().sum::<f64>() / ages.len() as f64;
        assert!((before - after).abs() < 1e-9);
        assert_eq!(ages[1], 30.0);
    }

    #[test]
    fn test_no_ages_means_no_histogram() {
        let ds = Dataset::new(vec![aged("m", None)]);
        assert!(impute_ages(&ds).is_none());
        assert!(age_histogram(&ds, 40).is_none());
    }

    #[test]
    fn test_histogram_bins_per_sex() {
        let ds = Dataset::new(vec![
            aged("m", Some(15.0)),
            aged("m", Some(70.0)),
            aged("f", Some(42.5)),
            aged("f", Some(90.0)),
        ]);
        let hist = age_histogram(&ds, 11).unwrap();
        assert_eq!(hist.bins(), 11);
        assert_eq!(hist.series.len(), 2);
        let f = &hist.series[0];
        let m = &hist.series[1];
        assert_eq!(f.sex, "f");
        assert_eq!(m.counts[0], 1);
        assert_eq!(m.counts[10], 1);
        assert_eq!(f.counts[5], 1);
        assert_eq!(hist.out_of_range, 1);
    }

    #[test]
    fn test_substring_counting() {
        assert_eq!(count_occurrences("kind kindness", "kind"), 2);
        assert_eq!(count_occurrences("Kind kind", "kind"), 1);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn test_corpus_joins_essays() {
        let mut p = profile("m", "straight");
        p.essays[0] = Some("hello".into());
        p.essays[9] = Some("world".into());
        let text = profile_text(&p);
        assert!(text.starts_with("hello nan"));
        assert!(text.ends_with("nan world"));
        assert_eq!(text.split(' ').count(), 10);

        let ds = Dataset::new(vec![p.clone(), p]);
        let freqs = word_frequencies(&corpus(&ds), &["hello".into(), "world".into()]);
        assert_eq!(freqs, vec![("hello".to_string(), 2), ("world".to_string(), 2)]);
    }

    #[test]
    fn test_parse_word_list() {
        assert_eq!(parse_word_list(" kind, fun ,,kind,  "), vec!["kind", "fun"]);
        assert!(parse_word_list("  ,  ").is_empty());
        assert_eq!(parse_word_list(&default_word_list()).len(), DEFAULT_WORDS.len());
    }

    #[test]
    fn test_hour_extraction() {
        assert_eq!(parse_hour("2012-06-10-00"), Some(0));
        assert_eq!(parse_hour("2012-06-10-23"), Some(23));
        assert_eq!(parse_hour("2012-06-28-07-30"), Some(7));
        assert_eq!(parse_hour("2012-06-28"), None);
        assert_eq!(parse_hour("2012-06-28-xx-30"), None);
    }

    #[test]
    fn test_hourly_activity_groups() {
        let mut a = profile("m", "straight");
        a.last_online = "2012-06-10-00-10".into();
        let mut b = profile("f", "straight");
        b.last_online = "2012-06-10-23-10".into();
        let mut c = profile("f", "gay");
        c.last_online = "2012-06-11-23-55".into();
        let ds = Dataset::new(vec![a, b, c]);

        let by_sex = hourly_activity(&ds, Column::Sex).unwrap();
        assert_eq!(by_sex.hours, vec![0, 23]);
        assert_eq!(by_sex.groups, vec![("f".to_string(), vec![0, 2]), ("m".to_string(), vec![1, 0])]);
        assert_eq!(by_sex.max_count(), 2);
    }

    #[test]
    fn test_one_malformed_stamp_fails_the_view() {
        let mut bad = profile("m", "straight");
        bad.last_online = "yesterday".into();
        let ds = Dataset::new(vec![profile("f", "gay"), bad]);
        match hourly_activity(&ds, Column::Orientation) {
            Err(DataError::MalformedLastOnline { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected malformed stamp error, got {other:?}"),
        }
    }

    #[test]
    fn test_hour_label_padding() {
        assert_eq!(hour_label(7), "07");
        assert_eq!(hour_label(19), "19");
    }
}
