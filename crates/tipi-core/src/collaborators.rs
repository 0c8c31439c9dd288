//! Interfaces the query builder needs from the outside world.
//!
//! The builder never owns the initiative-type taxonomy or the list of
//! parliamentary groups; it calls these traits and uses the answers verbatim.
//! Implementations are picked at startup and passed in.

use crate::model::FilterFragment;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// Country-specific knowledge of how an initiative type maps to store fields.
pub trait InitiativeTypeManager: Send + Sync {
    fn get_search_for(&self, value: &str) -> std::result::Result<FilterFragment, LookupError>;
}

pub trait ParliamentaryGroupLookup: Send + Sync {
    fn exists_by_name(&self, name: &str) -> std::result::Result<bool, LookupError>;
}

pub trait DateValidator: Send + Sync {
    fn is_valid_date(&self, value: &str) -> bool;
}

impl<T: InitiativeTypeManager + ?Sized> InitiativeTypeManager for Arc<T> {
    fn get_search_for(&self, value: &str) -> std::result::Result<FilterFragment, LookupError> {
        (**self).get_search_for(value)
    }
}

impl<T: ParliamentaryGroupLookup + ?Sized> ParliamentaryGroupLookup for Arc<T> {
    fn exists_by_name(&self, name: &str) -> std::result::Result<bool, LookupError> {
        (**self).exists_by_name(name)
    }
}

impl<T: DateValidator + ?Sized> DateValidator for Arc<T> {
    fn is_valid_date(&self, value: &str) -> bool {
        (**self).is_valid_date(value)
    }
}
