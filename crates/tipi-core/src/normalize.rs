use crate::model::{RawParameters, RawValue};

/// Drops every parameter that carries no constraint.
///
/// Empty strings, absent values and sequences that end up empty are removed.
/// Blank elements inside a sequence are removed too, so `tags=&tags=fiscal`
/// behaves like `tags=fiscal`.
pub fn normalize(params: RawParameters) -> RawParameters {
    let mut out = RawParameters::new();
    for (name, value) in params {
        let value = match value {
            RawValue::Multiple(items) => RawValue::Multiple(
                items
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
            ),
            other => other,
        };
        if value.is_empty() {
            tracing::trace!(param = %name, "dropping empty parameter");
            continue;
        }
        out.insert(name, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_empty_values() {
        let p = RawParameters::new()
            .with("title", "")
            .with("place", "Congreso")
            .with("author", RawValue::Absent)
            .with("tags", RawValue::Multiple(vec![]))
            .with("subtopics", vec!["", " "])
            .with("reference", "   ");
        let n = normalize(p);
        assert_eq!(n.keys().collect::<Vec<_>>(), vec!["place"]);
    }

    #[test]
    fn drops_blank_elements_in_sequences() {
        let p = RawParameters::new().with("tags", vec!["", "fiscal", " "]);
        let n = normalize(p);
        assert_eq!(n.get("tags"), Some(&RawValue::from(vec!["fiscal"])));
    }

    #[test]
    fn keeps_unknown_names() {
        // unknown fields are rejected later, not hidden here
        let n = normalize(RawParameters::new().with("foo", "bar"));
        assert!(n.contains_key("foo"));
    }
}
