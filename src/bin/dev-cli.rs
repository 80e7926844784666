use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use devto_client::{
    Article, ArticleQueryParams, ArticleState, DevClient, ListingCategory, ListingQueryParams,
    Options,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dev-cli",
    version,
    about = "Small async CLI for querying the DEV articles and listings API"
)]
struct Cli {
    /// Base URL for the API. Defaults to https://dev.to/api.
    #[arg(long, env = "DEV_HOST")]
    host: Option<String>,

    /// API key sent in the `api-key` header.
    #[arg(long, env = "DEV_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog endpoints.
    Endpoints {
        /// Filter endpoints by case-insensitive substring match on name.
        #[arg(long)]
        filter: Option<String>,
    },
    /// List articles.
    Articles(ArticlesArgs),
    /// Fetch one article by id, or by `--path username/slug`.
    Article {
        /// Numeric article id.
        #[arg(required_unless_present = "path", conflicts_with = "path")]
        id: Option<u32>,

        /// Article path in form username/slug.
        #[arg(long, value_name = "USERNAME/SLUG")]
        path: Option<String>,
    },
    /// List published listings.
    Listings {
        #[arg(long)]
        page: Option<i32>,

        #[arg(long)]
        per_page: Option<i32>,

        /// Restrict to one category (cfp, jobs, forhire, ...).
        #[arg(long)]
        category: Option<ListingCategory>,
    },
    /// Fetch one listing by id.
    Listing {
        id: u32,
    },
    /// Call any catalog endpoint by name.
    Call(CallArgs),
}

#[derive(Debug, Args)]
struct ArticlesArgs {
    #[arg(long)]
    page: Option<i32>,

    #[arg(long)]
    per_page: Option<i32>,

    #[arg(long)]
    tag: Option<String>,

    /// Comma-separated tags; articles matching any are returned.
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Comma-separated tags to exclude.
    #[arg(long, value_delimiter = ',')]
    tags_exclude: Vec<String>,

    #[arg(long)]
    username: Option<String>,

    /// fresh, rising or all.
    #[arg(long)]
    state: Option<ArticleState>,

    /// Most popular articles of the last N days.
    #[arg(long, value_name = "DAYS")]
    top: Option<i32>,

    #[arg(long)]
    collection_id: Option<i32>,

    #[command(flatten)]
    variant: ArticleVariant,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct ArticleVariant {
    /// Order newest publication first.
    #[arg(long)]
    sorted: bool,

    /// Fresh articles (`state=fresh`).
    #[arg(long)]
    fresh: bool,

    /// Rising articles (`state=rising`).
    #[arg(long)]
    rising: bool,

    /// Only articles with video.
    #[arg(long)]
    video: bool,

    /// Articles of the authenticated user (published and drafts).
    #[arg(long)]
    mine: bool,

    /// Only the authenticated user's published articles.
    #[arg(long)]
    mine_published: bool,

    /// Only the authenticated user's unpublished articles.
    #[arg(long)]
    mine_unpublished: bool,
}

#[derive(Debug, Args)]
struct CallArgs {
    /// Endpoint name (for example: getPublishedArticles).
    endpoint: String,

    /// Path parameter in form key=value. Repeat as needed.
    #[arg(long = "path-param", value_name = "KEY=VALUE")]
    path_param: Vec<String>,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

/// Entry point for the async CLI.
///
/// Loads an optional `.env`, parses arguments, builds the client and prints
/// JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    tolerate_missing_dotenv(dotenvy::dotenv())?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // `endpoints` is metadata-only; it does not require constructing an HTTP client.
    if let Command::Endpoints { filter } = &cli.command {
        print_endpoints(filter.as_deref());
        return Ok(());
    }

    let options = Options {
        host: cli.host.clone(),
        token: cli.api_key.clone().unwrap_or_default(),
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };
    let client = DevClient::new(options).context("failed to create client")?;

    match &cli.command {
        Command::Endpoints { .. } => unreachable!("handled above"),
        Command::Articles(args) => {
            let articles = list_articles(&client, args).await?;
            print_json(&articles, cli.compact)
        }
        Command::Article { id, path } => {
            let article = get_article(&client, *id, path.as_deref()).await?;
            print_json(&article, cli.compact)
        }
        Command::Listings {
            page,
            per_page,
            category,
        } => {
            let params = ListingQueryParams {
                page: *page,
                per_page: *per_page,
                category: None,
            };
            let listings = match category {
                Some(category) => client
                    .get_published_listings_by_category(*category, &params)
                    .await
                    .with_context(|| format!("failed to list '{category}' listings"))?,
                None => client
                    .get_published_listings(&params)
                    .await
                    .context("failed to list listings")?,
            };
            print_json(&listings, cli.compact)
        }
        Command::Listing { id } => {
            let listing = client
                .get_listing_by_id(*id)
                .await
                .with_context(|| format!("failed to fetch listing {id}"))?;
            print_json(&listing, cli.compact)
        }
        Command::Call(args) => {
            let value = call_endpoint(&client, args)
                .await
                .with_context(|| format!("endpoint call failed: '{}'", args.endpoint))?;
            print_json(&value, cli.compact)
        }
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is reported.
fn tolerate_missing_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).context("failed to load .env"),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "devto_client=info",
        1 => "devto_client=debug",
        _ => "devto_client=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the endpoint catalog, optionally filtered by name.
fn print_endpoints(filter: Option<&str>) {
    let filter = filter.map(str::to_ascii_lowercase);

    let endpoints: Vec<_> = DevClient::endpoints()
        .iter()
        .filter(|endpoint| {
            filter
                .as_ref()
                .is_none_or(|needle| endpoint.name.to_ascii_lowercase().contains(needle))
        })
        .collect();

    let (name_width, method_width) =
        endpoints
            .iter()
            .fold((0usize, 0usize), |(name_max, method_max), endpoint| {
                (
                    name_max.max(endpoint.name.len()),
                    method_max.max(endpoint.method.len()),
                )
            });

    for endpoint in endpoints {
        println!(
            "{:<name_width$}  {:<method_width$}  {}",
            endpoint.name, endpoint.method, endpoint.path_template
        );
    }
}

async fn list_articles(client: &DevClient, args: &ArticlesArgs) -> Result<Vec<Article>> {
    let params = ArticleQueryParams {
        page: args.page,
        per_page: args.per_page,
        tag: args.tag.clone(),
        tags: args.tags.clone(),
        tags_exclude: args.tags_exclude.clone(),
        username: args.username.clone(),
        state: args.state,
        top: args.top,
        collection_id: args.collection_id,
    };

    let variant = &args.variant;
    let articles = if variant.sorted {
        client.get_published_articles_sorted(&params).await
    } else if variant.fresh {
        client.get_fresh_articles(&params).await
    } else if variant.rising {
        client.get_rising_articles(&params).await
    } else if variant.video {
        client.get_articles_with_video(&params).await
    } else if variant.mine {
        client.get_user_articles(&params).await
    } else if variant.mine_published {
        client.get_user_published_articles(&params).await
    } else if variant.mine_unpublished {
        client.get_user_unpublished_articles(&params).await
    } else {
        client.get_published_articles(&params).await
    };

    articles.context("failed to list articles")
}

async fn get_article(client: &DevClient, id: Option<u32>, path: Option<&str>) -> Result<Article> {
    match (id, path) {
        (Some(id), _) => client
            .get_published_article_by_id(id)
            .await
            .with_context(|| format!("failed to fetch article {id}")),
        (None, Some(path)) => {
            let Some((username, slug)) = path.split_once('/') else {
                bail!("invalid --path value '{path}': expected username/slug");
            };
            client
                .get_published_article_by_path(username, slug)
                .await
                .with_context(|| format!("failed to fetch article '{path}'"))
        }
        (None, None) => bail!("pass an article id or --path"),
    }
}

/// Calls a catalog endpoint by name with raw path/query pairs and body.
async fn call_endpoint(client: &DevClient, args: &CallArgs) -> Result<Value> {
    // Parse repeatable `key=value` args into owned pairs first, then borrow as `&str`
    // for the client call to avoid temporary lifetime issues.
    let path_params = parse_pairs(&args.path_param, "--path-param")
        .context("failed to parse --path-param arguments")?;
    let query = parse_pairs(&args.query, "--query").context("failed to parse --query arguments")?;
    let body = parse_body(&args.body).context("failed to parse request body input")?;

    let borrowed_path: Vec<(&str, &str)> = path_params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let value = client
        .call_endpoint(&args.endpoint, &borrowed_path, query.as_slice(), body.as_ref())
        .await?;
    Ok(value)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Parses an optional JSON body from inline text or a file path.
fn parse_body(body: &BodyInput) -> Result<Option<Value>> {
    match (&body.body_json, &body.body_file) {
        (Some(raw), None) => serde_json::from_str(raw)
            .context("failed to parse JSON from --body-json")
            .map(Some),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read --body-file '{}'", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| {
                    format!("failed to parse JSON in --body-file '{}'", path.display())
                })
                .map(Some)
        }
        (None, None) => Ok(None),
        (Some(_), Some(_)) => bail!("use only one of --body-json or --body-file"),
    }
}

/// Prints a value as JSON, compact or pretty-formatted.
fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    println!("{}", rendered.context("failed to render JSON")?);
    Ok(())
}
