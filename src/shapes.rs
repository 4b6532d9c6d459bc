//! Migration of shape files to the begin/end hole command vocabulary.
//!
//! A shape file holds one record per vector path. Each record is a flat list of
//! command codes followed by their arguments, e.g.
//! `["f", "#345ffa", 1, "m", 3, 6, "l", 3, 22, "c"]`. The legacy vocabulary
//! closes a path with `c` and marks the path just drawn as a hole with a single
//! trailing `h`. The current vocabulary uses `cp` and brackets holes with
//! `bh` ... `eh`.
//!
//! Two file formats exist, chosen by extension:
//! - `.shapes.json`: a JSON array of arrays of strings and numbers
//! - `.shapes.txt`: one record per line, tokens separated by single spaces

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MOVE: &str = "m";
pub const LEGACY_CLOSE_PATH: &str = "c";
pub const CLOSE_PATH: &str = "cp";
pub const LEGACY_HOLE: &str = "h";
pub const BEGIN_HOLE: &str = "bh";
pub const END_HOLE: &str = "eh";

/// Error migrating one shape file. Other shape files are unaffected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("Cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is not an array of arrays
    #[error("Unexpected format: expected an array of shape records")]
    NotRecords,
    #[error("Unknown shape file format for '{}'", path.display())]
    UnknownFormat { path: PathBuf },
}

/// A token that may carry a command code.
pub trait CommandToken {
    /// The command code, if this token is one. Numbers are never codes.
    fn code(&self) -> Option<&str>;

    /// Build a token holding a command code.
    fn command(code: &str) -> Self;
}

impl CommandToken for Value {
    fn code(&self) -> Option<&str> {
        self.as_str()
    }

    fn command(code: &str) -> Self {
        Value::String(code.to_string())
    }
}

impl CommandToken for String {
    fn code(&self) -> Option<&str> {
        Some(self)
    }

    fn command(code: &str) -> Self {
        code.to_string()
    }
}

#[derive(Clone, Copy)]
enum Legacy {
    ClosePath,
    Hole,
}

fn legacy<T: CommandToken>(token: &T) -> Option<Legacy> {
    match token.code()? {
        LEGACY_CLOSE_PATH => Some(Legacy::ClosePath),
        LEGACY_HOLE => Some(Legacy::Hole),
        _ => None,
    }
}

/// Migrate one shape record in place. Returns whether anything changed.
///
/// `c` becomes `cp`. Each `h` becomes `eh`, and `bh` is inserted right after
/// the nearest `m` before it (or at the start of the record if there is none).
///
/// # Examples
///
/// ```
/// use animate_upgrade::shapes::migrate_record;
///
/// let mut record: Vec<String> = ["m", "0", "0", "l", "5", "0", "h"].map(String::from).to_vec();
/// assert!(migrate_record(&mut record));
/// assert_eq!(record, ["m", "bh", "0", "0", "l", "5", "0", "eh"]);
/// ```
pub fn migrate_record<T: CommandToken>(record: &mut Vec<T>) -> bool {
    let mut changed = false;
    let mut i = 0;

    while i < record.len() {
        match legacy(&record[i]) {
            Some(Legacy::ClosePath) => {
                record[i] = T::command(CLOSE_PATH);
                changed = true;
            }
            Some(Legacy::Hole) => {
                record[i] = T::command(END_HOLE);
                let begin = record[..i].iter().rposition(|token| token.code() == Some(MOVE)).map_or(0, |j| j + 1);
                record.insert(begin, T::command(BEGIN_HOLE));
                // The end-hole token moved one place to the right.
                i += 1;
                changed = true;
            }
            None => {}
        }
        i += 1;
    }

    changed
}

/// Migrate every record. Returns whether any record changed.
pub fn migrate_records<T: CommandToken>(records: &mut [Vec<T>]) -> bool {
    records.iter_mut().fold(false, |changed, record| migrate_record(record) | changed)
}

/// On-disk shape file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFormat {
    Json,
    Text,
}

impl ShapeFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(ShapeFormat::Json),
            Some("txt") => Some(ShapeFormat::Text),
            _ => None,
        }
    }
}

/// Parsed contents of a shape file.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeData {
    Json(Vec<Vec<Value>>),
    Text { records: Vec<Vec<String>>, line_ending: &'static str },
}

impl ShapeData {
    pub fn parse(format: ShapeFormat, content: &str) -> Result<Self, ShapeError> {
        match format {
            ShapeFormat::Json => {
                let value: Value = serde_json::from_str(content)?;
                let Value::Array(items) = value else {
                    return Err(ShapeError::NotRecords);
                };
                let records = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Array(tokens) => Ok(tokens),
                        _ => Err(ShapeError::NotRecords),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ShapeData::Json(records))
            }
            ShapeFormat::Text => {
                let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
                let records = content
                    .split(line_ending)
                    .map(|line| line.split(' ').map(str::to_string).collect())
                    .collect();
                Ok(ShapeData::Text { records, line_ending })
            }
        }
    }

    pub fn migrate(&mut self) -> bool {
        match self {
            ShapeData::Json(records) => migrate_records(records),
            ShapeData::Text { records, .. } => migrate_records(records),
        }
    }

    /// Serialize in the format the data was read from.
    pub fn serialize(&self) -> Result<String, ShapeError> {
        match self {
            ShapeData::Json(records) => Ok(serde_json::to_string_pretty(records)?),
            ShapeData::Text { records, line_ending } => {
                Ok(records.iter().map(|record| record.join(" ")).collect::<Vec<_>>().join(line_ending))
            }
        }
    }
}

/// Migrate a shape file in place.
///
/// Returns `Ok(true)` when the file was rewritten and `Ok(false)` when it held
/// no legacy codes and was left untouched.
pub fn migrate_shape_file(path: &Path) -> Result<bool, ShapeError> {
    let format = ShapeFormat::from_path(path).ok_or_else(|| ShapeError::UnknownFormat { path: path.to_path_buf() })?;
    let content = fs::read_to_string(path).map_err(|source| ShapeError::Read { path: path.to_path_buf(), source })?;

    let mut data = ShapeData::parse(format, &content)?;
    if !data.migrate() {
        return Ok(false);
    }

    let output = data.serialize()?;
    fs::write(path, output).map_err(|source| ShapeError::Write { path: path.to_path_buf(), source })?;
    Ok(true)
}
