use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::path::PathBuf;
use tipi_core::{BuilderConfig, DateBoundPolicy, PaginationStyle};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub country: String,
    pub taxonomy_file: Option<PathBuf>,
    pub groups_file: Option<PathBuf>,
    /// Group names served from memory when no groups file is set.
    pub groups: Vec<String>,
    pub otlp_endpoint: Option<String>,
    pub builder: BuilderConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let http_addr = get("TIPI_HTTP_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .context("TIPI_HTTP_ADDR")?;
        let mut builder = BuilderConfig::default();
        if let Some(s) = get("TIPI_PAGINATION") {
            builder.pagination = s.parse::<PaginationStyle>().map_err(|e| anyhow!(e))?;
        }
        if let Some(s) = get("TIPI_MAX_PER_PAGE") {
            builder.max_per_page = s.trim().parse::<u64>().context("TIPI_MAX_PER_PAGE")?;
        }
        if let Some(s) = get("TIPI_DATE_POLICY") {
            builder.date_policy = s.parse::<DateBoundPolicy>().map_err(|e| anyhow!(e))?;
        }
        Ok(Self {
            http_addr,
            country: get("TIPI_COUNTRY").unwrap_or_else(|| "es".to_string()),
            taxonomy_file: get("TIPI_TAXONOMY_FILE").map(PathBuf::from),
            groups_file: get("TIPI_GROUPS_FILE").map(PathBuf::from),
            groups: get("TIPI_GROUPS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            otlp_endpoint: get("OTLP_ENDPOINT"),
            builder,
        })
    }
}
