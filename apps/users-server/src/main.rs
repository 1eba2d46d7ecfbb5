use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use users_info::{config::UsersInfoConfig, UsersInfo};

mod db;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const API_INGRESS: &str = "api_ingress";
const USERS_INFO: &str = "users_info";

/// Users API server - CRUD over the user registry
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users API server - CRUD over the user registry")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir))?;
    tracing::info!("Users API server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Listen address: an explicit `--port` wins over `modules.api_ingress.bind_addr`.
fn bind_addr(config: &AppConfig, ingress: &ApiIngressConfig, args: &CliArgs) -> String {
    match (&ingress.bind_addr, args.port) {
        (Some(addr), None) => addr.clone(),
        _ => format!("{}:{}", config.server.host, config.server.port),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let ingress_cfg: ApiIngressConfig = config.module_config(API_INGRESS)?;
    let users_cfg: UsersInfoConfig = config.module_config(USERS_INFO)?;

    let db_cfg = config
        .database
        .clone()
        .context("database configuration is required")?;
    let base_dir = PathBuf::from(&config.server.home_dir);
    let conn = db::connect(&db_cfg, &base_dir, config.server.timeout_sec).await?;
    UsersInfo::migrate(&conn).await?;

    let users = UsersInfo::new(conn, users_cfg);
    let addr = bind_addr(&config, &ingress_cfg, &args);
    let ingress = ApiIngress::new(ingress_cfg);
    let router = ingress.build_router(users.register_rest(Router::new()), Some(UsersInfo::openapi()));

    ingress
        .serve(router, &addr, api_ingress::shutdown_signal())
        .await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let _: ApiIngressConfig = config.module_config(API_INGRESS)?;
    let _: UsersInfoConfig = config.module_config(USERS_INFO)?;
    if let Some(db_cfg) = &config.database {
        db::resolve_dsn(db_cfg, Path::new(&config.server.home_dir), false)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
