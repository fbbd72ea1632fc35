//! Heimdall dashboard server binary
//!
//! Wires configuration, the stats store, the external analyzer, and the
//! HTTP server together. Precedence for settings: CLI flags over
//! environment over config file over defaults.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use heimdall::cli::{parse_args, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use heimdall_api::{ApiConfig, ApiServer, ApiState};
use heimdall_core::{DashboardConfig, StatsStore};
use heimdall_tools::CliAnalyzer;

#[tokio::main]
async fn main() {
    let args = match parse_args(std::env::args()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if args.show_version {
        println!("Heimdall v{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if args.show_help {
        print_help();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match DashboardConfig::load(args.config_file.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    // Flags win over file and environment
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.public_dir {
        config.public_dir = dir.into();
        config.stats_file = config.public_dir.join("stats.json");
    }
    if let Some(file) = args.stats_file {
        config.stats_file = file.into();
    }
    if args.demo {
        config.demo_mode = true;
    }

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    info!("Starting Heimdall dashboard server");

    let stats = StatsStore::open(&config.stats_file);
    let analyzer = Arc::new(CliAnalyzer::new(
        config.diagnose.clone(),
        config.autonomous.clone(),
    ));

    let api_config = ApiConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let state = Arc::new(ApiState {
        config,
        stats,
        analyzer,
    });

    let server = ApiServer::new(api_config, state);
    if let Err(e) = server.start().await {
        eprintln!("Server error: {}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn print_help() {
    println!("Heimdall — dashboard server for an autonomous debugging agent");
    println!();
    println!("USAGE:");
    println!("    heimdall [options]");
    println!();
    println!("OPTIONS:");
    println!("    --host <addr>        Bind address (default: 0.0.0.0)");
    println!("    --port <n>           Bind port (default: 5000)");
    println!("    --config <file>      Configuration file (TOML)");
    println!("    --public-dir <dir>   Static dashboard directory (default: public)");
    println!("    --stats-file <file>  Stats file (default: <public-dir>/stats.json)");
    println!("    --demo               Always answer with canned demo payloads");
    println!("    --version            Show version");
    println!("    --help               Show this help");
}
