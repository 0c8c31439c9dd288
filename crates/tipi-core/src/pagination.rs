use crate::errors::{Result, SearchError};
use crate::model::{Pagination, RawParameters};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const DEFAULT_LIMIT: u64 = 20;
pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `page` / `per_page`
    #[default]
    PageBased,
    /// `limit` / `offset`
    LimitOffset,
}

impl PaginationStyle {
    pub fn keys(&self) -> [&'static str; 2] {
        match self {
            PaginationStyle::PageBased => ["page", "per_page"],
            PaginationStyle::LimitOffset => ["limit", "offset"],
        }
    }
}

impl FromStr for PaginationStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" | "page_based" => Ok(PaginationStyle::PageBased),
            "offset" | "limit_offset" => Ok(PaginationStyle::LimitOffset),
            other => Err(format!("unknown pagination style: {other}")),
        }
    }
}

/// Removes `name` from `params` and coerces it, or hands back `default`.
pub fn extract<T, F>(params: &mut RawParameters, name: &str, coerce: F, default: T) -> Result<T>
where
    F: FnOnce(&str) -> std::result::Result<T, String>,
{
    match params.remove(name) {
        Some(value) => {
            let raw = value.into_scalar(name)?;
            coerce(raw.trim()).map_err(|reason| SearchError::malformed(name, reason))
        }
        None => Ok(default),
    }
}

fn integer_at_least(min: u64) -> impl Fn(&str) -> std::result::Result<u64, String> {
    move |s| {
        let n: u64 = s
            .parse()
            .map_err(|_| format!("expected a non-negative integer, got {s:?}"))?;
        if n < min {
            return Err(format!("must be at least {min}"));
        }
        Ok(n)
    }
}

/// Takes both pagination keys out of `params` so they never reach a field rule.
pub fn extract_pagination(
    params: &mut RawParameters,
    style: PaginationStyle,
    max_per_page: u64,
) -> Result<Pagination> {
    let pagination = match style {
        PaginationStyle::PageBased => {
            let page = extract(params, "page", integer_at_least(1), DEFAULT_PAGE)?;
            let per_page = extract(params, "per_page", integer_at_least(1), DEFAULT_PER_PAGE)?;
            if per_page > max_per_page {
                return Err(SearchError::malformed(
                    "per_page",
                    format!("must be at most {max_per_page}"),
                ));
            }
            Pagination::Page { page, per_page }
        }
        PaginationStyle::LimitOffset => {
            let limit = extract(params, "limit", integer_at_least(0), DEFAULT_LIMIT)?;
            let offset = extract(params, "offset", integer_at_least(0), DEFAULT_OFFSET)?;
            if limit > max_per_page {
                return Err(SearchError::malformed(
                    "limit",
                    format!("must be at most {max_per_page}"),
                ));
            }
            Pagination::LimitOffset { limit, offset }
        }
    };
    Ok(pagination)
}
