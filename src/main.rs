//! OpenAPI Mock Server - CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use openapi_mock_server::{MockServer, OverrideTable, RouteTable, SpecDocument};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "openapi-mock-server",
    about = "Mock HTTP server for OpenAPI specifications - synthesized responses and overrides",
    version
)]
struct Args {
    /// Path to the OpenAPI specification (YAML or JSON)
    #[arg(required_unless_present = "print_config")]
    spec: Option<PathBuf>,

    /// Path to the override configuration file (optional)
    #[arg(short, long, default_value = "mock-config.yaml")]
    config: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Disable permissive CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Print a sample override configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate the specification and overrides, then exit
    #[arg(long)]
    validate: bool,

    /// Print the mock routes and exit
    #[arg(long)]
    list_routes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.print_config {
        let sample = include_str!("../demos/mock-config.yaml");
        println!("{}", sample);
        return Ok(());
    }

    let Some(spec_path) = args.spec else {
        anyhow::bail!("No specification file given");
    };
    if !spec_path.exists() {
        anyhow::bail!("Spec file {:?} does not exist", spec_path);
    }

    info!(path = ?spec_path, "Loading specification");
    let spec = SpecDocument::from_file(&spec_path)
        .with_context(|| format!("Failed to load specification {:?}", spec_path))?;

    let overrides = if args.config.exists() {
        info!(path = ?args.config, "Loading overrides");
        OverrideTable::from_file(&args.config)
            .with_context(|| format!("Failed to load overrides {:?}", args.config))?
    } else {
        info!("No override file, serving synthesized responses only");
        OverrideTable::default()
    };

    let routes = RouteTable::build(spec, overrides).context("Failed to build route table")?;

    if args.validate {
        println!(
            "Configuration is valid ({} routes, {} overrides)",
            routes.len(),
            routes.overrides().len()
        );
        return Ok(());
    }

    if args.list_routes {
        for route in routes.routes() {
            println!("{:<7} {}", route.method.as_str(), route.path);
        }
        return Ok(());
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    MockServer::new(routes)
        .with_cors(!args.no_cors)
        .serve(listener)
        .await?;

    Ok(())
}
