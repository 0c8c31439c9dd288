pub mod error;
pub mod file;
pub mod mem;
pub mod taxonomy;

pub use error::*;
pub use file::JsonLinesGroupDirectory;
pub use mem::InMemoryGroupDirectory;
pub use taxonomy::{TableTypeManager, TypeTaxonomy};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tipi_core::ParliamentaryGroupLookup;

/// The group directory the process should use: the JSON Lines file when one
/// is configured, otherwise an in-memory directory seeded with `seed`.
pub fn group_directory(
    groups_file: Option<PathBuf>,
    seed: Vec<String>,
) -> Arc<dyn ParliamentaryGroupLookup> {
    match groups_file {
        Some(path) => {
            if !seed.is_empty() {
                tracing::warn!("group file configured, ignoring {} seeded groups", seed.len());
            }
            tracing::info!(path = %path.display(), "using file-backed group directory");
            Arc::new(JsonLinesGroupDirectory::new(path))
        }
        None => {
            tracing::info!(groups = seed.len(), "using in-memory group directory");
            Arc::new(InMemoryGroupDirectory::with_groups(seed))
        }
    }
}

/// Taxonomy from `taxonomy_file` if given, else the built-in one for `country`.
pub fn type_manager(
    country: &str,
    taxonomy_file: Option<&Path>,
) -> Result<TableTypeManager, StoreError> {
    let taxonomy = match taxonomy_file {
        Some(path) => TypeTaxonomy::from_file(path)?,
        None => TypeTaxonomy::builtin(country)?,
    };
    Ok(TableTypeManager::new(taxonomy))
}
