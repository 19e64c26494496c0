use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// Number of free-text essay columns (`essay0` .. `essay9`).
pub const ESSAY_COUNT: usize = 10;

const REQUIRED_COLUMNS: &[&str] = &[
    "age", "sex", "orientation", "status", "drinks", "drugs", "smokes", "last_online",
    "essay0", "essay1", "essay2", "essay3", "essay4",
    "essay5", "essay6", "essay7", "essay8", "essay9",
];

// ─── COLUMNS ────────────────────────────────────────────────────

/// Categorical columns a view can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Orientation,
    Status,
    Drinks,
    Drugs,
    Smokes,
    Sex,
}

impl Column {
    /// Columns offered by the categorical distribution view.
    pub const DISTRIBUTION: &[Column] = &[
        Column::Orientation,
        Column::Status,
        Column::Drinks,
        Column::Drugs,
        Column::Smokes,
    ];

    /// Columns offered as the grouping of the activity view.
    pub const ACTIVITY: &[Column] = &[Column::Orientation, Column::Sex];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Orientation => "orientation",
            Column::Status => "status",
            Column::Drinks => "drinks",
            Column::Drugs => "drugs",
            Column::Smokes => "smokes",
            Column::Sex => "sex",
        }
    }

    /// Name with the first letter upper-cased, used in chart titles.
    pub fn title(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── RECORDS ────────────────────────────────────────────────────

/// One user profile. Missing CSV cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub age: Option<f64>,
    pub sex: Option<String>,
    pub orientation: Option<String>,
    pub status: Option<String>,
    pub drinks: Option<String>,
    pub drugs: Option<String>,
    pub smokes: Option<String>,
    /// `YYYY-MM-DD-HH-MM`
    pub last_online: String,
    pub essays: [Option<String>; ESSAY_COUNT],
}

impl Profile {
    pub fn value(&self, column: Column) -> Option<&str> {
        let v = match column {
            Column::Orientation => &self.orientation,
            Column::Status => &self.status,
            Column::Drinks => &self.drinks,
            Column::Drugs => &self.drugs,
            Column::Smokes => &self.smokes,
            Column::Sex => &self.sex,
        };
        v.as_deref()
    }
}

#[derive(Deserialize)]
struct CsvRow {
    age: Option<String>,
    sex: Option<String>,
    orientation: Option<String>,
    status: Option<String>,
    drinks: Option<String>,
    drugs: Option<String>,
    smokes: Option<String>,
    last_online: Option<String>,
    essay0: Option<String>,
    essay1: Option<String>,
    essay2: Option<String>,
    essay3: Option<String>,
    essay4: Option<String>,
    essay5: Option<String>,
    essay6: Option<String>,
    essay7: Option<String>,
    essay8: Option<String>,
    essay9: Option<String>,
}

/// Cell values read as missing, besides the empty cell.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !is_missing(s))
}

fn parse_age(raw: String, row: usize) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(age) if age.is_finite() => Ok(age),
        _ => Err(DataError::BadAge { row, value: raw }),
    }
}

impl CsvRow {
    fn into_profile(self, row: usize) -> Result<Profile> {
        let age = non_empty(self.age).map(|raw| parse_age(raw, row)).transpose()?;
        Ok(Profile {
            age,
            sex: non_empty(self.sex),
            orientation: non_empty(self.orientation),
            status: non_empty(self.status),
            drinks: non_empty(self.drinks),
            drugs: non_empty(self.drugs),
            smokes: non_empty(self.smokes),
            last_online: self.last_online.unwrap_or_default(),
            essays: [
                non_empty(self.essay0),
                non_empty(self.essay1),
                non_empty(self.essay2),
                non_empty(self.essay3),
                non_empty(self.essay4),
                non_empty(self.essay5),
                non_empty(self.essay6),
                non_empty(self.essay7),
                non_empty(self.essay8),
                non_empty(self.essay9),
            ],
        })
    }
}

// ─── DATASET ────────────────────────────────────────────────────

/// The loaded profile table. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    profiles: Vec<Profile>,
}

impl Dataset {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Parse a CSV table with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for &col in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == col) {
                return Err(DataError::MissingColumn(col));
            }
        }

        let mut profiles = Vec::new();
        for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row: CsvRow = result?;
            profiles.push(row.into_profile(idx)?);
        }
        Ok(Self { profiles })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Extract `archive` into `extract_dir` and parse the CSV it contains.
    pub fn load(archive: &Path, extract_dir: &Path) -> Result<Self> {
        let started = Instant::now();
        let csv_path = extract_archive(archive, extract_dir)?;
        let dataset = Self::from_path(&csv_path)?;
        info!(
            rows = dataset.len(),
            csv = %csv_path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        );
        Ok(dataset)
    }
}

// ─── ARCHIVE ────────────────────────────────────────────────────

/// Extract every entry of a zip archive into `dest`, overwriting existing
/// files. Returns the path of the first extracted `.csv` file.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<PathBuf> {
    let file = File::open(archive).map_err(|e| DataError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(io::BufReader::new(file)).map_err(|source| {
        DataError::Archive {
            path: archive.to_path_buf(),
            source,
        }
    })?;

    fs::create_dir_all(dest).map_err(|e| DataError::io(dest, e))?;

    let mut csv_path: Option<PathBuf> = None;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| DataError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;
        let rel = entry
            .enclosed_name()
            .ok_or_else(|| DataError::UnsafeEntry(entry.name().to_string()))?;
        let out = dest.join(&rel);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| DataError::io(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }
        let mut target = File::create(&out).map_err(|e| DataError::io(&out, e))?;
        io::copy(&mut entry, &mut target).map_err(|e| DataError::io(&out, e))?;
        debug!(entry = %rel.display(), "extracted");

        // macOS archivers add resource-fork shadows under __MACOSX/
        let is_csv = rel
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && csv_path.is_none() && !rel.starts_with("__MACOSX") {
            csv_path = Some(out);
        }
    }

    csv_path.ok_or_else(|| DataError::NoCsvInArchive(archive.to_path_buf()))
}
