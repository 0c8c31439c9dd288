//! Compound fields: several raw parameters that the store filters on as one.

use crate::errors::{Result, SearchError};
use crate::model::{CompoundDateRange, CompoundTagSelector, FieldValue, RawParameters};
use std::collections::BTreeMap;

pub const START_DATE: &str = "startdate";
pub const END_DATE: &str = "enddate";
pub const DATE_FIELD: &str = "date";
pub const TAGS: &str = "tags";
pub const SUBTOPICS: &str = "subtopics";
pub const TAG_FIELD: &str = "tags";

/// Logical fields only the joiners may create.
const SYNTHETIC_ONLY: &[&str] = &[DATE_FIELD];

fn take_bound(params: &mut RawParameters, name: &str) -> Result<Option<String>> {
    params
        .remove(name)
        .map(|v| v.into_scalar(name).map(|s| s.trim().to_string()))
        .transpose()
}

pub fn join_date_range(params: &mut RawParameters) -> Result<CompoundDateRange> {
    let start = take_bound(params, START_DATE)?;
    let end = take_bound(params, END_DATE)?;
    Ok(CompoundDateRange { start, end })
}

pub fn join_tag_selector(params: &mut RawParameters) -> CompoundTagSelector {
    let tags = params.remove(TAGS).map(|v| v.into_list()).unwrap_or_default();
    let subtopics = params
        .remove(SUBTOPICS)
        .map(|v| v.into_list())
        .unwrap_or_default();
    CompoundTagSelector { tags, subtopics }
}

/// Collapses the compound parameters into their synthetic fields and wraps
/// everything else untouched. The synthetic keys are always present.
pub fn join_compound_fields(mut params: RawParameters) -> Result<BTreeMap<String, FieldValue>> {
    if let Some(name) = SYNTHETIC_ONLY.iter().find(|n| params.contains_key(n)) {
        return Err(SearchError::UnrecognizedField((*name).to_string()));
    }
    let dates = join_date_range(&mut params)?;
    let tags = join_tag_selector(&mut params);
    tracing::trace!(
        date = %dates,
        tags = tags.tags.len(),
        subtopics = tags.subtopics.len(),
        "compound fields joined"
    );
    let mut out: BTreeMap<String, FieldValue> = params
        .into_iter()
        .map(|(k, v)| (k, FieldValue::Raw(v)))
        .collect();
    out.insert(DATE_FIELD.to_string(), FieldValue::DateRange(dates));
    out.insert(TAG_FIELD.to_string(), FieldValue::TagSelector(tags));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawValue;

    #[test]
    fn dates_join_into_one_field() {
        let p = RawParameters::new()
            .with("startdate", "2020-01-01")
            .with("enddate", "2020-12-31")
            .with("place", "Pleno");
        let joined = join_compound_fields(p).unwrap();
        assert_eq!(
            joined.get("date"),
            Some(&FieldValue::DateRange(CompoundDateRange {
                start: Some("2020-01-01".into()),
                end: Some("2020-12-31".into()),
            }))
        );
        assert!(!joined.contains_key("startdate"));
        assert!(!joined.contains_key("enddate"));
        assert_eq!(
            joined.get("place"),
            Some(&FieldValue::Raw(RawValue::from("Pleno")))
        );
    }

    #[test]
    fn synthetic_fields_exist_without_input() {
        let joined = join_compound_fields(RawParameters::new()).unwrap();
        assert_eq!(
            joined.get("date"),
            Some(&FieldValue::DateRange(CompoundDateRange::default()))
        );
        assert_eq!(
            joined.get("tags"),
            Some(&FieldValue::TagSelector(CompoundTagSelector::default()))
        );
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn tags_and_subtopics_pair_up() {
        let mut p = RawParameters::new()
            .with("tags", "fiscal")
            .with("subtopics", vec!["irpf", "iva"]);
        let sel = join_tag_selector(&mut p);
        assert_eq!(sel.tags, vec!["fiscal"]);
        assert_eq!(sel.subtopics, vec!["irpf", "iva"]);
        assert!(p.is_empty());
    }

    #[test]
    fn date_bounds_trimmed() {
        let mut p = RawParameters::new()
            .with("startdate", " 2020-01-01")
            .with("enddate", "2020-12-31\t");
        let range = join_date_range(&mut p).unwrap();
        assert_eq!(range.to_string(), "2020-01-01_2020-12-31");
    }

    #[test]
    fn raw_date_is_not_accepted() {
        let err = join_compound_fields(RawParameters::new().with("date", "2020-01-01")).unwrap_err();
        assert_eq!(err, SearchError::UnrecognizedField("date".into()));
    }

    #[test]
    fn repeated_start_date_is_malformed() {
        let p = RawParameters::new().with("startdate", vec!["2020-01-01", "2021-01-01"]);
        let err = join_compound_fields(p).unwrap_err();
        assert_eq!(err.field(), Some("startdate"));
    }
}
