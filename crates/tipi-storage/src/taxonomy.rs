//! Country-specific initiative types.
//!
//! A taxonomy maps the type names users search by onto the store's type
//! codes. Names found in the table match any of their codes; anything else is
//! matched literally against the alternative type label.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tipi_core::{FilterFragment, InitiativeTypeManager, LookupError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTaxonomy {
    pub country: String,
    pub types: BTreeMap<String, Vec<String>>,
}

impl TypeTaxonomy {
    pub fn builtin(country: &str) -> Result<Self, StoreError> {
        match country.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(spain()),
            other => Err(StoreError::UnknownCountry(other.to_string())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            line: e.line(),
            reason: e.to_string(),
        })
    }
}

fn spain() -> TypeTaxonomy {
    let table: &[(&str, &[&str])] = &[
        ("Proyecto de ley", &["121"]),
        ("Proposición de ley", &["122", "123", "124", "125"]),
        ("Proposición no de Ley", &["161", "162"]),
        ("Interpelación", &["170", "172"]),
        ("Moción", &["173"]),
        ("Pregunta oral", &["178", "180", "181"]),
        ("Pregunta escrita", &["184"]),
        ("Solicitud de comparecencia", &["212", "213", "219"]),
        ("Real Decreto-ley", &["130"]),
    ];
    TypeTaxonomy {
        country: "es".to_string(),
        types: table
            .iter()
            .map(|(name, codes)| {
                (
                    name.to_string(),
                    codes.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect(),
    }
}

pub struct TableTypeManager {
    taxonomy: TypeTaxonomy,
}

impl TableTypeManager {
    pub fn new(taxonomy: TypeTaxonomy) -> Self {
        tracing::debug!(
            country = %taxonomy.country,
            types = taxonomy.types.len(),
            "initiative type taxonomy loaded"
        );
        Self { taxonomy }
    }

    pub fn for_country(country: &str) -> Result<Self, StoreError> {
        Ok(Self::new(TypeTaxonomy::builtin(country)?))
    }

    pub fn country(&self) -> &str {
        &self.taxonomy.country
    }
}

impl InitiativeTypeManager for TableTypeManager {
    fn get_search_for(&self, value: &str) -> Result<FilterFragment, LookupError> {
        let mut fragment = FilterFragment::new();
        match self.taxonomy.types.get(value.trim()) {
            Some(codes) if !codes.is_empty() => {
                fragment.insert("initiative_type".into(), json!({ "$in": codes }));
            }
            _ => {
                fragment.insert("initiative_type_alt".into(), json!(value));
            }
        }
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn known_type_matches_codes() {
        let m = TableTypeManager::for_country("ES").unwrap();
        assert_eq!(m.country(), "es");
        let f = m.get_search_for("Proposición no de Ley").unwrap();
        assert_eq!(
            JsonValue::Object(f),
            json!({"initiative_type": {"$in": ["161", "162"]}})
        );
    }

    #[test]
    fn unknown_type_matches_label() {
        let m = TableTypeManager::for_country("es").unwrap();
        let f = m.get_search_for("Declaración institucional").unwrap();
        assert_eq!(
            JsonValue::Object(f),
            json!({"initiative_type_alt": "Declaración institucional"})
        );
    }

    #[test]
    fn unknown_country() {
        assert!(matches!(
            TableTypeManager::for_country("xx"),
            Err(StoreError::UnknownCountry(c)) if c == "xx"
        ));
    }

    #[test]
    fn taxonomy_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"country":"cl","types":{{"Mensaje":["M"],"Moción":["MO"]}}}}"#).unwrap();
        let t = TypeTaxonomy::from_file(file.path()).unwrap();
        assert_eq!(t.country, "cl");
        let m = TableTypeManager::new(t);
        assert_eq!(
            JsonValue::Object(m.get_search_for("Mensaje").unwrap()),
            json!({"initiative_type": {"$in": ["M"]}})
        );
    }

    #[test]
    fn malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"country\": ").unwrap();
        assert!(matches!(
            TypeTaxonomy::from_file(file.path()),
            Err(StoreError::Parse { .. })
        ));
    }
}
