use crate::collaborators::{DateValidator, InitiativeTypeManager, ParliamentaryGroupLookup};
use crate::errors::{Result, SearchError};
use crate::join::{self, END_DATE, START_DATE, SUBTOPICS, TAGS};
use crate::model::{FilterDocument, FilterFragment, FinalQuery, RawParameters};
use crate::normalize::normalize;
use crate::pagination::{extract_pagination, PaginationStyle, DEFAULT_MAX_PER_PAGE};
use crate::rules::{DateBoundPolicy, FieldRuleRegistry, RuleContext};
use crate::util::IsoDateValidator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub pagination: PaginationStyle,
    pub max_per_page: u64,
    pub date_policy: DateBoundPolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationStyle::PageBased,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            date_policy: DateBoundPolicy::Reject,
        }
    }
}

/// Turns a request's raw parameters into a store filter plus pagination.
///
/// Runs normalize, pagination extraction, compound joining, per-field
/// dispatch and merge, in that order. Holds no per-request state, so one
/// builder serves every request.
#[derive(Clone)]
pub struct SearchQueryBuilder {
    types: Arc<dyn InitiativeTypeManager>,
    groups: Arc<dyn ParliamentaryGroupLookup>,
    dates: Arc<dyn DateValidator>,
    registry: FieldRuleRegistry,
    config: BuilderConfig,
}

impl SearchQueryBuilder {
    pub fn new(
        types: Arc<dyn InitiativeTypeManager>,
        groups: Arc<dyn ParliamentaryGroupLookup>,
    ) -> Self {
        Self {
            types,
            groups,
            dates: Arc::new(IsoDateValidator),
            registry: FieldRuleRegistry::standard(),
            config: BuilderConfig::default(),
        }
    }

    pub fn with_date_validator(mut self, dates: Arc<dyn DateValidator>) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Raw parameter names a caller may send, pagination keys included.
    pub fn accepted_parameters(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .registry
            .fields()
            .filter(|f| *f != join::DATE_FIELD)
            .collect();
        names.extend([START_DATE, END_DATE, TAGS, SUBTOPICS]);
        names.extend(self.config.pagination.keys());
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn build(&self, params: &RawParameters) -> Result<FinalQuery> {
        let span = tracing::debug_span!("build_query", params = params.len());
        let _enter = span.enter();

        let mut params = normalize(params.clone());
        let pagination =
            extract_pagination(&mut params, self.config.pagination, self.config.max_per_page)?;
        tracing::debug!(?pagination, remaining = params.len(), "pagination extracted");

        let fields = join::join_compound_fields(params)?;

        let ctx = RuleContext {
            types: self.types.as_ref(),
            groups: self.groups.as_ref(),
            dates: self.dates.as_ref(),
            date_policy: self.config.date_policy,
        };
        let mut filter = FilterDocument::new();
        for (field, value) in fields {
            let fragment = self.registry.dispatch(&field, value, &ctx)?;
            tracing::trace!(%field, clauses = fragment.len(), "field dispatched");
            merge_fragment(&mut filter, fragment)?;
        }
        tracing::debug!(clauses = filter.len(), "query built");
        Ok(FinalQuery::new(filter, pagination))
    }
}

/// Key union. Two rules claiming the same store key is a registry bug.
pub fn merge_fragment(doc: &mut FilterDocument, fragment: FilterFragment) -> Result<()> {
    for (key, expr) in fragment {
        if doc.contains_key(&key) {
            return Err(SearchError::Internal(format!(
                "store field `{key}` produced by two rules"
            )));
        }
        doc.insert(key, expr);
    }
    Ok(())
}
