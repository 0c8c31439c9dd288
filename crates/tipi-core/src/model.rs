use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Partial store filter contributed by one logical field.
pub type FilterFragment = Map<String, JsonValue>;
/// Merged filter handed to the store. Keys are kept sorted.
pub type FilterDocument = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

impl RawValue {
    /// Empty string, absent, or a sequence with nothing left in it.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Absent => true,
            RawValue::Single(s) => s.trim().is_empty(),
            RawValue::Multiple(v) => v.iter().all(|s| s.trim().is_empty()),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            RawValue::Absent => Vec::new(),
            RawValue::Single(s) => vec![s],
            RawValue::Multiple(v) => v,
        }
    }

    pub fn into_scalar(self, field: &str) -> crate::Result<String> {
        match self {
            RawValue::Single(s) => Ok(s),
            RawValue::Multiple(mut v) if v.len() == 1 => Ok(v.remove(0)),
            RawValue::Multiple(v) => Err(crate::SearchError::malformed(
                field,
                format!("expected a single value, got {}", v.len()),
            )),
            RawValue::Absent => Err(crate::SearchError::malformed(field, "missing value")),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Single(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Single(s)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(v: Vec<String>) -> Self {
        RawValue::Multiple(v)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(v: Vec<&str>) -> Self {
        RawValue::Multiple(v.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Absent)
    }
}

/// Request parameters as they came off the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawParameters(pub BTreeMap<String, RawValue>);

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Repeated keys become `Multiple`, in arrival order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = BTreeMap::new();
        for (k, v) in pairs {
            let v = v.into();
            let slot = out.entry(k.into()).or_insert(RawValue::Absent);
            *slot = match std::mem::take(slot) {
                RawValue::Absent => RawValue::Single(v),
                RawValue::Single(prev) => RawValue::Multiple(vec![prev, v]),
                RawValue::Multiple(mut prev) => {
                    prev.push(v);
                    RawValue::Multiple(prev)
                }
            };
        }
        Self(out)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl IntoIterator for RawParameters {
    type Item = (String, RawValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, RawValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// `startdate`/`enddate` joined into one criterion. `None` is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompoundDateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl CompoundDateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for CompoundDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.start.as_deref().unwrap_or(""),
            self.end.as_deref().unwrap_or("")
        )
    }
}

/// `tags`/`subtopics` joined into one criterion over the `tags` array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompoundTagSelector {
    pub tags: Vec<String>,
    pub subtopics: Vec<String>,
}

impl CompoundTagSelector {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.subtopics.is_empty()
    }
}

/// What a field rule receives once joining is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Raw(RawValue),
    DateRange(CompoundDateRange),
    TagSelector(CompoundTagSelector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum Pagination {
    Page { page: u64, per_page: u64 },
    LimitOffset { limit: u64, offset: u64 },
}

impl Pagination {
    /// (limit, offset) as the store wants it.
    pub fn limit_offset(&self) -> (u64, u64) {
        match *self {
            Pagination::Page { page, per_page } => {
                (per_page, page.saturating_sub(1).saturating_mul(per_page))
            }
            Pagination::LimitOffset { limit, offset } => (limit, offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalQuery {
    filter: FilterDocument,
    pagination: Pagination,
}

impl FinalQuery {
    pub(crate) fn new(filter: FilterDocument, pagination: Pagination) -> Self {
        Self { filter, pagination }
    }

    pub fn filter_document(&self) -> &FilterDocument {
        &self.filter
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn page(&self) -> Option<u64> {
        match self.pagination {
            Pagination::Page { page, .. } => Some(page),
            Pagination::LimitOffset { .. } => None,
        }
    }

    pub fn per_page(&self) -> Option<u64> {
        match self.pagination {
            Pagination::Page { per_page, .. } => Some(per_page),
            Pagination::LimitOffset { .. } => None,
        }
    }

    pub fn limit(&self) -> u64 {
        self.pagination.limit_offset().0
    }

    pub fn offset(&self) -> u64 {
        self.pagination.limit_offset().1
    }
}
