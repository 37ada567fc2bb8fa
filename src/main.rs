use anyhow::Result;
use clap::{Parser, ValueEnum};
use gcp_placement::config::Config;
use gcp_placement::gcp::auth::{validate_project_id, GcpCredentials};
use gcp_placement::gcp::client::{format_gcp_error, GcpClient};
use gcp_placement::placement::{
    GcpPlacementLookup, MokaPlacementCache, PlacementClass, PlacementPolicy,
    PlacementSelectorTerm, ResolveContext, Resolution, Resolver,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Resolve placement selector terms to a GCP placement policy
#[derive(Parser, Debug)]
#[command(name = "gcp-placement", version, about, long_about = None)]
struct Args {
    /// Name of the node class requesting placement
    #[arg(short, long)]
    class: String,

    /// Placement policy name to select (repeatable); omit to request no placement
    #[arg(short, long = "selector")]
    selectors: Vec<String>,

    /// Treat the class as a legacy node template
    #[arg(long)]
    node_template: bool,

    /// GCP project to use
    #[arg(short, long)]
    project: Option<String>,

    /// GCP region to use
    #[arg(short, long)]
    region: Option<String>,

    /// Access token to use instead of Application Default Credentials
    #[arg(long, env = "GCP_PLACEMENT_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Cache TTL in seconds
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Abort the remote lookup after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Resolve this many times (later runs are served from the cache)
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Remember project and region in the config file
    #[arg(long)]
    save: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// What gets printed for a resolution
#[derive(Debug, Serialize)]
struct ResolutionReport<'a> {
    class: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<&'a PlacementPolicy>,
}

impl<'a> ResolutionReport<'a> {
    fn new(class: &'a str, resolution: &'a Resolution) -> Self {
        let outcome = match resolution {
            Resolution::NotRequested => "not_requested",
            Resolution::NoMatch => "no_match",
            Resolution::Matched(_) => "matched",
        };
        Self {
            class,
            outcome,
            policy: resolution.policy(),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcp-placement started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcp-placement").join("gcp-placement.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcp-placement").join("gcp-placement.log");
    }
    PathBuf::from("gcp-placement.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    if let Err(err) = run(args).await {
        tracing::error!("{:?}", err);
        eprintln!("Error: {}", format_gcp_error(&err));
        // Flush buffered log lines before exiting
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    let project = args
        .project
        .clone()
        .unwrap_or_else(|| config.effective_project());
    let region = args
        .region
        .clone()
        .unwrap_or_else(|| config.effective_region());

    if !validate_project_id(&project) {
        return Err(anyhow::anyhow!(
            "No valid GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag"
        ));
    }

    if args.save {
        config = config.with_location(&project, &region);
        config.save()?;
    }

    if let Some(ttl) = args.ttl_secs {
        config.cache_ttl_secs = Some(ttl);
    }

    tracing::info!("Using project: {}, region: {}", project, region);

    let endpoint = config.effective_endpoint();
    let client = match args.access_token.as_deref() {
        Some(token) => GcpClient::with_credentials(
            GcpCredentials::from_access_token(token),
            &project,
            &region,
            &endpoint,
            config.request_timeout(),
        )?,
        None => GcpClient::new(&project, &region, &endpoint, config.request_timeout()).await?,
    };

    let cache = MokaPlacementCache::new(config.cache_max_capacity(), config.cache_ttl());
    tracing::info!("Caching resolved placements for {:?}", cache.ttl());
    let resolver = Resolver::new(GcpPlacementLookup::new(client), cache);

    let selector_terms = (!args.selectors.is_empty()).then(|| {
        args.selectors
            .iter()
            .map(PlacementSelectorTerm::new)
            .collect::<Vec<_>>()
    });
    let class = PlacementClass::new(&args.class, selector_terms);

    let mut ctx = ResolveContext {
        is_node_template: args.node_template,
        ..ResolveContext::default()
    };
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    for _ in 0..args.repeat.max(1) {
        let resolution = resolver.get(&ctx, &class).await?;
        let report = ResolutionReport::new(&class.name, &resolution);
        match args.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        }
    }

    Ok(())
}
