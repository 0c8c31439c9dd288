//! Per-field translation into store filter fragments.
//!
//! Every logical field maps to exactly one [`FieldRule`]. Rules never emit
//! overlapping store keys, so the builder can merge fragments by plain union.

use crate::collaborators::{DateValidator, InitiativeTypeManager, ParliamentaryGroupLookup};
use crate::errors::{Result, SearchError};
use crate::model::{CompoundDateRange, CompoundTagSelector, FieldValue, FilterFragment};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;

pub const TYPE_MANAGER: &str = "initiative type manager";
pub const GROUP_LOOKUP: &str = "parliamentary group lookup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    /// `{field: value}`
    Default,
    Title,
    Topic,
    TagSubtopic,
    Type,
    Author,
    Deputy,
    DateRange,
}

/// What to do with a date bound the validator rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBoundPolicy {
    #[default]
    Reject,
    Drop,
}

impl FromStr for DateBoundPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DateBoundPolicy::Reject),
            "drop" => Ok(DateBoundPolicy::Drop),
            other => Err(format!("unknown date policy: {other}")),
        }
    }
}

/// Collaborators and knobs a rule may need while dispatching.
pub struct RuleContext<'a> {
    pub types: &'a dyn InitiativeTypeManager,
    pub groups: &'a dyn ParliamentaryGroupLookup,
    pub dates: &'a dyn DateValidator,
    pub date_policy: DateBoundPolicy,
}

impl FieldRule {
    pub fn get_search_for(
        &self,
        field: &str,
        value: FieldValue,
        ctx: &RuleContext<'_>,
    ) -> Result<FilterFragment> {
        match (self, value) {
            (FieldRule::TagSubtopic, FieldValue::TagSelector(sel)) => Ok(tag_subtopic(&sel)),
            (FieldRule::DateRange, FieldValue::DateRange(range)) => {
                date_range(&range, ctx.dates, ctx.date_policy)
            }
            (FieldRule::TagSubtopic, _) | (FieldRule::DateRange, _) => Err(SearchError::Internal(
                format!("compound field `{field}` reached dispatch unjoined"),
            )),
            (rule, FieldValue::Raw(raw)) => {
                let value = raw.into_scalar(field)?;
                rule.scalar(field, value, ctx)
            }
            (_, _) => Err(SearchError::Internal(format!(
                "field `{field}` got a compound value"
            ))),
        }
    }

    fn scalar(&self, field: &str, value: String, ctx: &RuleContext<'_>) -> Result<FilterFragment> {
        let fragment = match self {
            FieldRule::Default => single(field, JsonValue::String(value)),
            FieldRule::Title => single(field, json!({ "$regex": value, "$options": "im" })),
            FieldRule::Topic => single("topics", JsonValue::String(value)),
            FieldRule::Deputy => single("author_deputies", JsonValue::String(value)),
            FieldRule::Author => {
                let exists = ctx.groups.exists_by_name(&value).map_err(|e| {
                    tracing::warn!(error = %e, "group lookup failed");
                    SearchError::CollaboratorUnavailable {
                        collaborator: GROUP_LOOKUP,
                        reason: e.to_string(),
                    }
                })?;
                let key = if exists {
                    "author_parliamentarygroups"
                } else {
                    "author_others"
                };
                single(key, JsonValue::String(value))
            }
            FieldRule::Type => ctx.types.get_search_for(&value).map_err(|e| {
                tracing::warn!(error = %e, "initiative type lookup failed");
                SearchError::CollaboratorUnavailable {
                    collaborator: TYPE_MANAGER,
                    reason: e.to_string(),
                }
            })?,
            FieldRule::TagSubtopic | FieldRule::DateRange => {
                return Err(SearchError::Internal(format!(
                    "compound rule called with scalar for `{field}`"
                )))
            }
        };
        Ok(fragment)
    }
}

fn single(key: &str, value: JsonValue) -> FilterFragment {
    let mut m = FilterFragment::new();
    m.insert(key.to_string(), value);
    m
}

/// One `$elemMatch` over `tags` so tag and subtopic hit the same element.
fn tag_subtopic(sel: &CompoundTagSelector) -> FilterFragment {
    if sel.is_empty() {
        return FilterFragment::new();
    }
    let mut predicate = FilterFragment::new();
    if !sel.tags.is_empty() {
        predicate.insert("tag".into(), json!({ "$in": sel.tags }));
    }
    if !sel.subtopics.is_empty() {
        predicate.insert("subtopic".into(), json!({ "$in": sel.subtopics }));
    }
    single("tags", json!({ "$elemMatch": predicate }))
}

fn date_range(
    range: &CompoundDateRange,
    validator: &dyn DateValidator,
    policy: DateBoundPolicy,
) -> Result<FilterFragment> {
    if range.is_unbounded() {
        return Ok(FilterFragment::new());
    }
    let mut bounds = FilterFragment::new();
    for (param, op, bound) in [
        ("startdate", "$gte", &range.start),
        ("enddate", "$lte", &range.end),
    ] {
        let Some(bound) = bound else { continue };
        if validator.is_valid_date(bound) {
            bounds.insert(op.into(), JsonValue::String(bound.clone()));
            continue;
        }
        match policy {
            DateBoundPolicy::Reject => {
                return Err(SearchError::malformed(
                    param,
                    format!("expected a yyyy-mm-dd date, got {bound:?}"),
                ))
            }
            DateBoundPolicy::Drop => {
                tracing::debug!(param, bound = %bound, "dropping invalid date bound");
            }
        }
    }
    if bounds.is_empty() {
        return Ok(FilterFragment::new());
    }
    Ok(single("updated", JsonValue::Object(bounds)))
}

const STANDARD_RULES: &[(&str, FieldRule)] = &[
    ("author", FieldRule::Author),
    ("date", FieldRule::DateRange),
    ("deputy", FieldRule::Deputy),
    ("place", FieldRule::Default),
    ("reference", FieldRule::Default),
    ("state", FieldRule::Default),
    ("status", FieldRule::Default),
    ("tags", FieldRule::TagSubtopic),
    ("title", FieldRule::Title),
    ("topic", FieldRule::Topic),
    ("type", FieldRule::Type),
];

/// Fixed mapping from logical field name to rule.
#[derive(Debug, Clone)]
pub struct FieldRuleRegistry {
    rules: &'static [(&'static str, FieldRule)],
}

impl Default for FieldRuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldRuleRegistry {
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES,
        }
    }

    pub fn rule_for(&self, field: &str) -> Result<FieldRule> {
        self.rules
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| *rule)
            .ok_or_else(|| SearchError::UnrecognizedField(field.to_string()))
    }

    /// Logical field names, synthetic ones included.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    pub fn dispatch(
        &self,
        field: &str,
        value: FieldValue,
        ctx: &RuleContext<'_>,
    ) -> Result<FilterFragment> {
        self.rule_for(field)?.get_search_for(field, value, ctx)
    }
}
