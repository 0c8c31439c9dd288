use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tipi_core::{BuilderConfig, DateBoundPolicy, PaginationStyle, RawParameters, SearchQueryBuilder};

#[derive(Parser)]
#[command(name = "tipi")]
#[command(about = "Inspect the store filters built from initiative search parameters", long_about = None)]
struct Cli {
    #[command(flatten)]
    opts: BuilderOpts,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct BuilderOpts {
    #[arg(long, env = "TIPI_COUNTRY", default_value = "es", global = true)]
    country: String,
    #[arg(long, env = "TIPI_TAXONOMY_FILE", global = true)]
    taxonomy_file: Option<PathBuf>,
    #[arg(long, env = "TIPI_GROUPS_FILE", global = true)]
    groups_file: Option<PathBuf>,
    /// Parliamentary group known to the in-memory directory; repeatable.
    #[arg(long = "group", value_name = "NAME", global = true)]
    groups: Vec<String>,
    #[arg(long, env = "TIPI_PAGINATION", value_enum, default_value_t = PaginationArg::Page, global = true)]
    pagination: PaginationArg,
    #[arg(long, env = "TIPI_MAX_PER_PAGE", default_value_t = 100, global = true)]
    max_per_page: u64,
    #[arg(long, env = "TIPI_DATE_POLICY", value_enum, default_value_t = DatePolicyArg::Reject, global = true)]
    date_policy: DatePolicyArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaginationArg {
    /// `page` and `per_page`
    #[value(alias = "page_based")]
    Page,
    /// `limit` and `offset`
    #[value(alias = "limit_offset")]
    Offset,
}

impl From<PaginationArg> for PaginationStyle {
    fn from(arg: PaginationArg) -> Self {
        match arg {
            PaginationArg::Page => PaginationStyle::PageBased,
            PaginationArg::Offset => PaginationStyle::LimitOffset,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DatePolicyArg {
    /// Fail on a malformed date bound
    Reject,
    /// Skip a malformed date bound
    Drop,
}

impl From<DatePolicyArg> for DateBoundPolicy {
    fn from(arg: DatePolicyArg) -> Self {
        match arg {
            DatePolicyArg::Reject => DateBoundPolicy::Reject,
            DatePolicyArg::Drop => DateBoundPolicy::Drop,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Build the filter for `name=value` parameters; repeat a name for lists.
    Build {
        params: Vec<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// List the parameter names the builder accepts.
    Fields,
}

fn parse_pair(s: &str) -> Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got {s:?}"))?;
    if k.trim().is_empty() {
        bail!("empty parameter name in {s:?}");
    }
    Ok((k.trim().to_string(), v.to_string()))
}

fn builder_config(opts: &BuilderOpts) -> BuilderConfig {
    BuilderConfig {
        pagination: opts.pagination.into(),
        max_per_page: opts.max_per_page,
        date_policy: opts.date_policy.into(),
    }
}

fn query_builder(opts: &BuilderOpts) -> Result<SearchQueryBuilder> {
    let types = tipi_storage::type_manager(&opts.country, opts.taxonomy_file.as_deref())?;
    let groups = tipi_storage::group_directory(opts.groups_file.clone(), opts.groups.clone());
    Ok(SearchQueryBuilder::new(Arc::new(types), groups).with_config(builder_config(opts)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let builder = query_builder(&cli.opts)?;
    match cli.cmd {
        Cmd::Build { params, pretty } => {
            let pairs = params
                .iter()
                .map(|p| parse_pair(p))
                .collect::<Result<Vec<_>>>()?;
            let query = builder.build(&RawParameters::from_pairs(pairs))?;
            let out = serde_json::json!({
                "filter": query.filter_document(),
                "pagination": query.pagination(),
                "limit": query.limit(),
                "offset": query.offset(),
            });
            if pretty {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", serde_json::to_string(&out)?);
            }
        }
        Cmd::Fields => {
            for name in builder.accepted_parameters() {
                println!("{name}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs() {
        assert_eq!(
            parse_pair("title=pension").unwrap(),
            ("title".to_string(), "pension".to_string())
        );
        assert_eq!(
            parse_pair("enddate=").unwrap(),
            ("enddate".to_string(), String::new())
        );
        assert_eq!(parse_pair("q=a=b").unwrap().1, "a=b");
        assert!(parse_pair("title").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn cli_builds_config() {
        let cli = Cli::try_parse_from([
            "tipi",
            "--pagination",
            "offset",
            "--date-policy",
            "drop",
            "build",
            "limit=5",
        ])
        .unwrap();
        let cfg = builder_config(&cli.opts);
        assert_eq!(cfg.pagination, PaginationStyle::LimitOffset);
        assert_eq!(cfg.date_policy, DateBoundPolicy::Drop);
        let q = query_builder(&cli.opts)
            .unwrap()
            .build(&RawParameters::from_pairs([parse_pair("limit=5").unwrap()]))
            .unwrap();
        assert_eq!(q.limit(), 5);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["tipi", "--date-policy", "ignore", "fields"]).is_err());
        assert!(Cli::try_parse_from(["tipi", "--pagination", "cursor", "fields"]).is_err());
    }

    #[test]
    fn defaults_and_aliases() {
        let cli = Cli::try_parse_from(["tipi", "fields"]).unwrap();
        assert_eq!(builder_config(&cli.opts), BuilderConfig::default());
        let cli = Cli::try_parse_from(["tipi", "--pagination", "limit_offset", "fields"]).unwrap();
        assert_eq!(builder_config(&cli.opts).pagination, PaginationStyle::LimitOffset);
    }

    #[test]
    fn seeded_groups_resolve_authors() {
        let cli = Cli::try_parse_from([
            "tipi",
            "--group",
            "Grupo Parlamentario Mixto",
            "build",
            "author=Grupo Parlamentario Mixto",
        ])
        .unwrap();
        let q = query_builder(&cli.opts)
            .unwrap()
            .build(&RawParameters::from_pairs([parse_pair(
                "author=Grupo Parlamentario Mixto",
            )
            .unwrap()]))
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(q.filter_document().clone()),
            serde_json::json!({"author_parliamentarygroups": "Grupo Parlamentario Mixto"})
        );
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
