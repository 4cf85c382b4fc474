//! Canonical taxonomy labels.
//!
//! Known spelling and casing variants of subject, chapter, and subtopic names
//! are mapped to one preferred display string through a [`LabelTable`]. The
//! table is data, not code: a default table ships with this crate and further
//! tables can be layered on top from CSV files with the columns
//! `scope,variant,canonical`.
//!
//! Lookups use a compact key (alphanumerics only, case-folded), so
//! `Operating-Systems`, `operating systems` and `OPERATING SYSTEMS` all hit the
//! same row. Labels without a row pass through title-cased.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::text::{clean_label, compact_key, title_case};

const BUILTIN_LABELS: &str = include_str!("../data/labels.csv");

/// Which taxonomy field a label row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelScope {
    Subject,
    Chapter,
    Subtopic,
    /// Applies to every field unless a scoped row overrides it.
    Any,
}

impl LabelScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Chapter => "chapter",
            Self::Subtopic => "subtopic",
            Self::Any => "*",
        }
    }
}

impl fmt::Display for LabelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "chapter" => Ok(Self::Chapter),
            "subtopic" => Ok(Self::Subtopic),
            "*" | "any" => Ok(Self::Any),
            other => Err(other.to_string()),
        }
    }
}

/// One variant-to-canonical row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub scope: LabelScope,
    pub variant: String,
    pub canonical: String,
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    scope: String,
    variant: String,
    canonical: String,
}

/// Lookup table from label variants to canonical display labels.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: BTreeMap<(LabelScope, String), LabelEntry>,
}

impl LabelTable {
    /// A table with no rows: every label passes through title-cased.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_reader(BUILTIN_LABELS.as_bytes(), "builtin labels.csv")
    }

    /// Loads a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| NormalizeError::LabelTableRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Loads a table from CSV data with a `scope,variant,canonical` header.
    ///
    /// Lines starting with `#` are ignored. Rows with a blank variant are
    /// skipped; a later row for the same scope and variant replaces an
    /// earlier one.
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let parse_error = |e: csv::Error| NormalizeError::LabelTableParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        };
        let headers = csv_reader.headers().map_err(parse_error)?.clone();

        let mut table = Self::empty();
        for record in csv_reader.records() {
            let record = record.map_err(parse_error)?;
            let line = record.position().map_or(0, csv::Position::line);
            let row: LabelRow = record.deserialize(Some(&headers)).map_err(parse_error)?;
            let scope = row
                .scope
                .parse::<LabelScope>()
                .map_err(|scope| NormalizeError::InvalidScope {
                    source_name: source_name.to_string(),
                    line,
                    scope,
                })?;
            if compact_key(&row.variant).is_empty() {
                continue;
            }
            if row.canonical.trim().is_empty() {
                return Err(NormalizeError::BlankCanonical {
                    source_name: source_name.to_string(),
                    line,
                    variant: row.variant,
                });
            }
            table.insert(scope, &row.variant, &row.canonical);
        }
        debug!(source = source_name, rows = table.len(), "loaded label table");
        Ok(table)
    }

    /// Adds or replaces one row.
    pub fn insert(&mut self, scope: LabelScope, variant: &str, canonical: &str) {
        let key = compact_key(variant);
        if key.is_empty() {
            return;
        }
        self.entries.insert(
            (scope, key),
            LabelEntry {
                scope,
                variant: variant.trim().to_string(),
                canonical: canonical.trim().to_string(),
            },
        );
    }

    /// Layers `other` on top of this table; its rows win on collisions.
    pub fn extend(&mut self, other: LabelTable) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LabelEntry> {
        self.entries.values()
    }

    /// Canonical label for a variant. Scoped rows take precedence over `*` rows.
    pub fn lookup(&self, scope: LabelScope, label: &str) -> Option<&str> {
        let key = compact_key(label);
        if key.is_empty() {
            return None;
        }
        self.entries
            .get(&(scope, key.clone()))
            .or_else(|| self.entries.get(&(LabelScope::Any, key)))
            .map(|entry| entry.canonical.as_str())
    }

    /// Cleans and canonicalizes a raw label for display.
    ///
    /// Returns `None` for blank input and for stray `Question <digits>`
    /// markers, which must not become taxonomy nodes.
    pub fn normalize_label(&self, scope: LabelScope, raw: &str) -> Option<String> {
        let cleaned = clean_label(raw)?;
        match self.lookup(scope, &cleaned) {
            Some(canonical) => Some(canonical.to_string()),
            None => Some(title_case(&cleaned)),
        }
    }

    /// Convenience for optional input fields.
    pub fn normalize_opt(&self, scope: LabelScope, raw: Option<&str>) -> Option<String> {
        raw.and_then(|value| self.normalize_label(scope, value))
    }
}
