//! eavql CLI - Compile and serve EAV reports
//!
//! Usage:
//!   eavql serve [--config <eavql.toml>] [--listen <addr>]
//!   eavql compile <request.json> [--dialect <dialect>] [--output <format>]
//!   eavql entities [--config <eavql.toml>]
//!   eavql seed <data.json> [--config <eavql.toml>]
//!
//! Examples:
//!   eavql seed demos/seed.json
//!   eavql compile demos/approved_loans.json --dialect oracle
//!   eavql serve --listen 0.0.0.0:8080

use clap::{Parser, Subcommand, ValueEnum};
use eavql::config::Settings;
use eavql::metadata::{MetadataService, RelationshipCatalog};
use eavql::report::{ReportCompiler, ReportRequest};
use eavql::sql::Dialect;
use eavql::store::Database;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eavql")]
#[command(about = "eavql - Compile declarative multi-entity reports to SQL over EAV tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the report HTTP API
    Serve {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on (overrides server.listen_addr)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Compile a report request to SQL
    Compile {
        /// Path to the request JSON file
        file: PathBuf,

        /// SQL dialect to generate
        #[arg(short, long, default_value = "oracle")]
        dialect: DialectArg,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// List entities available to reports
    Entities {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load EAV rows from a JSON file into the configured database
    Seed {
        /// Path to the data JSON file
        file: PathBuf,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Oracle,
    Tsql,
    Postgres,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Oracle => Dialect::Oracle,
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL followed by the bound parameters
    Sql,
    /// Output the compiled report as JSON
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => cmd_serve(config, listen),
        Commands::Compile {
            file,
            dialect,
            output,
        } => cmd_compile(file, dialect, output),
        Commands::Entities { config } => cmd_entities(config),
        Commands::Seed { file, config } => cmd_seed(file, config),
    }
}

fn load_settings(config: Option<&Path>) -> Option<Settings> {
    match Settings::load_from(config) {
        Ok(settings) => Some(settings),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

fn open_database(settings: &Settings) -> Option<Database> {
    let opened = settings
        .database_path()
        .map_err(eavql::Error::from)
        .and_then(|path| Database::open(path).map_err(eavql::Error::from));
    match opened {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            None
        }
    }
}

fn cmd_serve(config: Option<PathBuf>, listen: Option<String>) -> ExitCode {
    let Some(mut settings) = load_settings(config.as_deref()) else {
        return ExitCode::FAILURE;
    };
    if let Some(addr) = listen {
        settings.server.listen_addr = addr;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(eavql::web::serve(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_compile(file: PathBuf, dialect: DialectArg, output: OutputFormat) -> ExitCode {
    // Read the file
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let request: ReportRequest = match serde_json::from_str(&source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid request in '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let report = match ReportCompiler::new(dialect.into()).compile(&request) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            println!("{}", report.sql);
            if !report.parameters.is_empty() {
                println!();
                println!("-- Parameters:");
                for (name, value) in report.parameters.iter() {
                    println!("--   :{} = {}", name, value);
                }
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn cmd_entities(config: Option<PathBuf>) -> ExitCode {
    let Some(settings) = load_settings(config.as_deref()) else {
        return ExitCode::FAILURE;
    };
    let Some(db) = open_database(&settings) else {
        return ExitCode::FAILURE;
    };

    let catalog = match settings
        .relationships_path()
        .map_err(eavql::Error::from)
        .and_then(|path| RelationshipCatalog::load(path).map_err(eavql::Error::from))
    {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading relationships: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = MetadataService::new(Arc::new(db), catalog);
    let entities = service.list_entities();
    if entities.is_empty() {
        println!("No entities found.");
    }
    for entity in entities {
        let relationships = service.catalog().relationships(&entity);
        if relationships.is_empty() {
            println!("{}", entity);
        } else {
            let targets: Vec<_> = relationships
                .iter()
                .map(|r| format!("{} via {}", r.to, r.via))
                .collect();
            println!("{} ({})", entity, targets.join(", "));
        }
    }
    ExitCode::SUCCESS
}

/// Seed file shape:
///
/// ```json
/// { "user_data": [ { "entity_id": 1, "first_name": "Alice" } ] }
/// ```
fn cmd_seed(file: PathBuf, config: Option<PathBuf>) -> ExitCode {
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let data: Map<String, Value> = match serde_json::from_str(&source) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid seed data in '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let Some(settings) = load_settings(config.as_deref()) else {
        return ExitCode::FAILURE;
    };
    let Some(db) = open_database(&settings) else {
        return ExitCode::FAILURE;
    };

    for (entity, rows) in &data {
        match db.seed_entity(entity, rows) {
            Ok(count) => println!("{}: {} rows", entity, count),
            Err(e) => {
                eprintln!("Error seeding '{}': {}", entity, e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
