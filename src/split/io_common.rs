use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::split::*;

/// The formats of survey exports that can be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

impl Provider {
    /// Excel files are recognized by their extension, everything else is read as CSV.
    pub fn from_path(path: &str) -> Provider {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("xlsx") => Provider::Xlsx,
            _ => Provider::Csv,
        }
    }
}

impl FromStr for Provider {
    type Err = QualsplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Provider::Csv),
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            x => whatever!("Provider not implemented {:?}", x),
        }
    }
}

pub fn resolve_path(root: &Path, file: &str) -> String {
    let p: PathBuf = root.join(file);
    p.as_path().display().to_string()
}

/// Replaces the path separators, so that a file name cannot point outside of its directory.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect()
}
