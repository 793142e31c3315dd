use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mineget::{
    config::Config,
    output::{print_platforms, print_report, OutputFormat, Report},
    EndpointKind, IdentifierMap, Mineget, ResourceId,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit codes for scripting
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "mineget")]
#[command(
    author,
    version,
    about = "Aggregate resource statistics across Minecraft plugin marketplaces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query every metric and print a combined summary
    Get(QueryArgs),

    /// Total downloads across platforms
    Downloads(QueryArgs),

    /// Count-weighted average rating
    Rating(QueryArgs),

    /// Lowest price above zero
    Price(QueryArgs),

    /// Most recently published version
    LatestVersion(QueryArgs),

    /// Resource name on each platform
    Name(QueryArgs),

    /// List known platforms
    Platforms,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Resource on a platform, e.g. `spigot=83767` or `github=owner/repo`
    #[arg(
        short,
        long = "id",
        value_name = "PLATFORM=ID",
        required_unless_present = "json",
        value_parser = parse_id_pair
    )]
    ids: Vec<(String, ResourceId)>,

    /// Resources as a JSON object, e.g. `{"spigot": 83767, "modrinth": "huskhomes"}`
    #[arg(long, value_name = "OBJECT")]
    json: Option<String>,

    /// Output format (table, json)
    #[arg(short, long)]
    format: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable config file: {:#}", e);
            Config::default()
        }),
    };

    match cli.command {
        Commands::Get(args) => run_query(&config, None, args).await,
        Commands::Downloads(args) => run_query(&config, Some(EndpointKind::Downloads), args).await,
        Commands::Rating(args) => run_query(&config, Some(EndpointKind::Rating), args).await,
        Commands::Price(args) => run_query(&config, Some(EndpointKind::Price), args).await,
        Commands::LatestVersion(args) => {
            run_query(&config, Some(EndpointKind::LatestVersion), args).await
        }
        Commands::Name(args) => run_query(&config, Some(EndpointKind::Name), args).await,
        Commands::Platforms => {
            let client = Mineget::new(&config)?;
            print_platforms(client.registry());
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "mineget=debug" } else { "mineget=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one query command; `None` queries every endpoint.
async fn run_query(config: &Config, kind: Option<EndpointKind>, args: QueryArgs) -> Result<u8> {
    let format_str = args.format.unwrap_or_else(|| config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let client = Mineget::new(config)?;
    let ids = collect_ids(args.json.as_deref(), args.ids)?;

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Querying {} platforms...", ids.len()));
        Some(pb)
    } else {
        None
    };

    let report = match kind {
        None => client.get(&ids).await.map(Report::Summary),
        Some(EndpointKind::Downloads) => Ok(Report::Downloads(client.downloads(&ids).await)),
        Some(EndpointKind::Rating) => Ok(Report::Rating(client.rating(&ids).await)),
        Some(EndpointKind::Price) => Ok(Report::Price(client.price(&ids).await)),
        Some(EndpointKind::LatestVersion) => client
            .latest_version(&ids)
            .await
            .map(Report::LatestVersion),
        Some(EndpointKind::Name) => Ok(Report::Name(client.name(&ids).await)),
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = report?;
    print_report(&report, format)?;

    if report.is_success() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::ERROR)
    }
}

/// Merges `--json` and `--id` input; `--id` entries come last and win.
fn collect_ids(json: Option<&str>, pairs: Vec<(String, ResourceId)>) -> Result<IdentifierMap> {
    let mut ids = match json {
        Some(text) => {
            let value: serde_json::Value =
                serde_json::from_str(text).context("--json is not valid JSON")?;
            IdentifierMap::from_json(&value)?
        }
        None => IdentifierMap::new(),
    };
    for (platform, id) in pairs {
        ids.insert(platform, id);
    }
    Ok(ids)
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'mineget config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

/// Parses `platform=id`. Ids made only of digits are numeric.
fn parse_id_pair(s: &str) -> Result<(String, ResourceId), String> {
    let (platform, id) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected PLATFORM=ID, got `{}`", s))?;

    let platform = platform.trim().to_lowercase();
    if platform.is_empty() {
        return Err(format!("Missing platform in `{}`", s));
    }
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("Missing id for {}", platform));
    }

    Ok((platform, ResourceId::parse(id)))
}
