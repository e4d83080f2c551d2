//! File manipulation utilities.

use std::fs;
use std::fs::File;
use std::io::Error;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, to_writer_pretty};

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, Error> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

/// JSON-encodes the `value` in pretty-printed form and writes it to a given `path`,
/// creating missing parent directories.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), Error> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    Ok(to_writer_pretty(file, value)?)
}

/// Scans `dir` for files named `{prefix}{week}{suffix}` and returns the distinct week
/// numbers in ascending order. A missing directory yields an empty list.
pub fn scan_week_files(dir: impl AsRef<Path>, prefix: &str, suffix: &str) -> Vec<u32> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return vec![],
    };
    let mut weeks: Vec<u32> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            let middle = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
            middle.parse().ok()
        })
        .collect();
    weeks.sort_unstable();
    weeks.dedup();
    weeks
}
