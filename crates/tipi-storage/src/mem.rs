use std::collections::HashSet;
use tipi_core::{LookupError, ParliamentaryGroupLookup};

/// Parliamentary groups fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupDirectory {
    names: HashSet<String>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.into().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }
}

impl ParliamentaryGroupLookup for InMemoryGroupDirectory {
    fn exists_by_name(&self, name: &str) -> Result<bool, LookupError> {
        Ok(self.names.contains(name.trim()))
    }
}
