use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use profile_insights::analysis::{categorical_distribution, hourly_activity, Distribution};
use profile_insights::dataset::{extract_archive, Column, Dataset};
use profile_insights::error::DataError;
use profile_insights::views::{compute, ViewOutput, ViewRequest};
use zip::write::SimpleFileOptions;

const HEADER: &str = "age,status,sex,orientation,drinks,drugs,smokes,last_online,\
essay0,essay1,essay2,essay3,essay4,essay5,essay6,essay7,essay8,essay9";

fn profile_row(age: &str, sex: &str, orientation: &str, last_online: &str, essay0: &str) -> String {
    format!("{age},single,{sex},{orientation},socially,never,no,{last_online},{essay0},,,,,,,,,")
}

fn sample_csv() -> String {
    let rows = [
        profile_row("25", "m", "straight", "2012-06-28-00-10", "kind and funny"),
        profile_row("31", "f", "straight", "2012-06-28-13-40", "looking for love"),
        profile_row("44", "m", "gay", "2012-06-29-13-02", "fun times"),
        profile_row("38", "f", "gay", "2012-06-30-23-55", "honest and loyal"),
    ];
    format!("{HEADER}\n{}\n", rows.join("\n"))
}

/// Write a zip holding `entries` and return its path.
fn write_archive(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("profiles.zip");
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

#[test]
fn test_load_archive_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = sample_csv();
    let archive = write_archive(dir.path(), &[("okcupid_profiles.csv", &csv)]);
    let extract_dir = dir.path().join("extracted_folder");

    let ds = Dataset::load(&archive, &extract_dir).unwrap();
    assert_eq!(ds.len(), 4);
    assert!(extract_dir.join("okcupid_profiles.csv").is_file());

    let Distribution::Bars(rows) = categorical_distribution(&ds, Column::Orientation) else {
        panic!("expected bars");
    };
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["gay", "straight"]);
    for r in &rows {
        assert_eq!((r.male, r.female, r.total), (1, 1, 2));
        assert!((r.male_pct() - 50.0).abs() < 1e-9);
        assert!((r.female_pct() - 50.0).abs() < 1e-9);
    }

    let activity = hourly_activity(&ds, Column::Sex).unwrap();
    assert_eq!(activity.hours, vec![0, 13, 23]);
    let m = activity.groups.iter().find(|(g, _)| g == "m").unwrap();
    assert_eq!(m.1, vec![1, 1, 0]);
    let f = activity.groups.iter().find(|(g, _)| g == "f").unwrap();
    assert_eq!(f.1, vec![0, 1, 1]);
}

#[test]
fn test_extraction_overwrites_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let csv = sample_csv();
    let archive = write_archive(dir.path(), &[("okcupid_profiles.csv", &csv)]);
    let extract_dir = dir.path().join("out");

    let first = extract_archive(&archive, &extract_dir).unwrap();
    fs::write(&first, "stale").unwrap();
    let second = extract_archive(&archive, &extract_dir).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), csv);
}

#[test]
fn test_archive_without_csv_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(dir.path(), &[("readme.txt", "nothing here")]);
    let err = Dataset::load(&archive, &dir.path().join("out")).unwrap_err();
    assert!(matches!(err, DataError::NoCsvInArchive(_)));
}

#[test]
fn test_macos_shadow_entries_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let csv = sample_csv();
    let archive = write_archive(
        dir.path(),
        &[("__MACOSX/._okcupid_profiles.csv", "junk"), ("okcupid_profiles.csv", &csv)],
    );
    let ds = Dataset::load(&archive, &dir.path().join("out")).unwrap();
    assert_eq!(ds.len(), 4);
}

#[test]
fn test_entry_escaping_extract_dir_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(dir.path(), &[("../evil.csv", "age\n1\n")]);
    let extract_dir = dir.path().join("nested").join("out");

    let err = extract_archive(&archive, &extract_dir).unwrap_err();
    assert!(matches!(err, DataError::UnsafeEntry(_)));
    assert!(!dir.path().join("nested").join("evil.csv").exists());
    assert!(!dir.path().join("evil.csv").exists());
}

#[test]
fn test_missing_archive_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dataset::load(&dir.path().join("absent.zip"), &dir.path().join("out")).unwrap_err();
    assert!(matches!(err, DataError::Io { .. }));
}

#[test]
fn test_views_over_loaded_archive() {
    let dir = tempfile::tempdir().unwrap();
    let csv = sample_csv();
    let archive = write_archive(dir.path(), &[("data/okcupid_profiles.csv", &csv)]);
    let ds = Dataset::load(&archive, &dir.path().join("out")).unwrap();

    let ViewOutput::Age(Some(hist)) = compute(&ds, &ViewRequest::Age { bins: 11 }).unwrap() else {
        panic!("expected an age histogram");
    };
    let total: usize = hist.series.iter().flat_map(|s| s.counts.iter()).sum();
    assert_eq!(total, 4);
    assert_eq!(hist.out_of_range, 0);

    let request = ViewRequest::Intents {
        words: vec!["fun".into(), "love".into(), "casual".into()],
        max_words: 11,
    };
    let ViewOutput::Intents { frequencies, cloud } = compute(&ds, &request).unwrap() else {
        panic!("expected intents output");
    };
    assert_eq!(frequencies[0], ("fun".to_string(), 2));
    assert_eq!(frequencies[1], ("love".to_string(), 1));
    assert_eq!(frequencies[2], ("casual".to_string(), 0));
    assert_eq!(cloud.words.len(), 2);
}
