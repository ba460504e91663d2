//! swift-registry CLI - serve, seed and query the SWIFT code registry

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swift_registry::config::{self, RegistryConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "swift-registry")]
#[command(version)]
#[command(about = "SWIFT/BIC code registry - headquarters and branch lookup")]
#[command(long_about = r#"
swift-registry keeps a table of SWIFT/BIC codes and serves it over HTTP:
  • Lookup by code (headquarters come with their branches)
  • Lookup by country
  • Conflict-checked create, branch-guarded delete
  • Bulk seeding from the SWIFT spreadsheet export

Example usage:
  swift-registry seed --csv swift_codes.csv
  swift-registry show DEUTDEFFXXX
  swift-registry serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (default: swift-registry.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long, global = true, env = "SWIFT_REGISTRY_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Replace the registry contents with a CSV export
    Seed {
        /// CSV file to load
        #[arg(long, env = "CSV_FILE_PATH")]
        csv: Option<PathBuf>,
    },

    /// Show a single SWIFT code
    Show {
        /// 11-character SWIFT code
        code: String,
    },

    /// List the SWIFT codes of a country
    Country {
        /// ISO 3166-1 alpha-2 country code
        iso2: String,
    },

    /// Add a SWIFT code
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        bank: String,

        #[arg(long = "country-iso2")]
        country_iso2: String,

        #[arg(long = "country-name")]
        country_name: String,

        #[arg(long = "code-type", default_value = "BIC11")]
        code_type: String,

        /// Mark the code as a headquarters (its code must end with XXX)
        #[arg(long)]
        headquarter: bool,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        town: Option<String>,

        #[arg(long = "time-zone")]
        time_zone: Option<String>,
    },

    /// Delete a SWIFT code
    Remove {
        /// 11-character SWIFT code
        code: String,
    },

    /// Show statistics about the registry
    Stats,

    /// Write a config file with the current settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn emit_error(output_mode: OutputMode, err: &anyhow::Error) {
    match output_mode {
        OutputMode::Json => {
            let envelope = serde_json::json!({
                "ok": false,
                "error": err.to_string(),
            });
            println!("{}", envelope);
        }
        OutputMode::Human => swift_registry::ui::error(&format!("{:#}", err)),
    }
}

fn init_logging(verbose: bool, serving: bool) {
    let default_level = match (verbose, serving) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    init_logging(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    if let Err(err) = run(cli, output_mode) {
        emit_error(output_mode, &err);
        std::process::exit(1);
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let file_config = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = file_config.database_path(cli.database.as_deref());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = file_config.host(host.as_deref());
            let port = file_config.port(port);
            config::ensure_db_dir(&database)?;

            if output_mode.is_human() {
                swift_registry::ui::header(
                    swift_registry::ui::Icons::GLOBE,
                    &format!("Server running at http://{}:{}/api/v1/swift-codes", host, port),
                );
            }

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(swift_registry::server::start_server(&host, port, &database))
        }
        Commands::Seed { csv } => {
            let csv = file_config
                .csv_path(csv.as_deref())
                .ok_or_else(|| anyhow::anyhow!("no CSV file given (use --csv or set `csv` in the config file)"))?;
            commands::run_seed(output_mode, &database, &csv)
        }
        Commands::Show { code } => commands::run_show(output_mode, &database, &code),
        Commands::Country { iso2 } => commands::run_country(output_mode, &database, &iso2),
        Commands::Add {
            code,
            bank,
            country_iso2,
            country_name,
            code_type,
            headquarter,
            address,
            town,
            time_zone,
        } => {
            let candidate = swift_registry::NewSwiftRecord {
                swift_code: Some(code),
                bank_name: Some(bank),
                address,
                town_name: town,
                country_name: Some(country_name),
                country_iso2: Some(country_iso2),
                is_headquarter: Some(headquarter),
                time_zone,
                code_type: Some(code_type),
            };
            commands::run_add(output_mode, &database, &candidate)
        }
        Commands::Remove { code } => commands::run_remove(output_mode, &database, &code),
        Commands::Stats => commands::run_stats(output_mode, &database),
        Commands::Init { force } => {
            let new_config = RegistryConfig {
                database: Some(database.display().to_string()),
                ..file_config
            };
            commands::run_init(output_mode, &config_path, &new_config, force)
        }
        Commands::Version => commands::run_version(output_mode),
    }
}
