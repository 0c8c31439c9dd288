//! Parliamentary groups kept in a JSON Lines file, one record per line:
//!
//! ```text
//! {"name": "Grupo Parlamentario Socialista", "shortname": "PSOE"}
//! ```
//!
//! The file is the store of record, so every lookup reads it. A missing or
//! unreadable file is an outage, not an empty directory.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tipi_core::{LookupError, ParliamentaryGroupLookup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParliamentaryGroup {
    pub name: String,
    #[serde(default)]
    pub shortname: Option<String>,
}

pub fn read_groups(path: &Path) -> Result<Vec<ParliamentaryGroup>, StoreError> {
    let fh = File::open(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut out = Vec::new();
    for (i, line) in BufReader::new(fh).lines().enumerate() {
        let line = line.map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let group = serde_json::from_str(&line).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            line: i + 1,
            reason: e.to_string(),
        })?;
        out.push(group);
    }
    Ok(out)
}

pub struct JsonLinesGroupDirectory {
    path: PathBuf,
}

impl JsonLinesGroupDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParliamentaryGroupLookup for JsonLinesGroupDirectory {
    fn exists_by_name(&self, name: &str) -> Result<bool, LookupError> {
        let groups = read_groups(&self.path).map_err(|e| match e {
            StoreError::Io { .. } => LookupError::Unavailable(e.to_string()),
            _ => LookupError::Corrupt(e.to_string()),
        })?;
        let name = name.trim();
        Ok(groups.iter().any(|g| g.name == name))
    }
}
