use anyhow::Result;
use gatewalk::http::HttpServer;
use gatewalk::{Config, RouteService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Config first so its log_level can seed the logger; RUST_LOG still wins
    let config = Config::load();
    let filter = match &config {
        Ok(config) => config.log_filter(),
        Err(_) => std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    };
    env_logger::Builder::new().parse_filters(&filter).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "serve" => run_http_server(config?).await?,
        "verify" => run_verification(config?).await?,
        other => {
            anyhow::bail!("Unknown command '{}'. Usage: gatewalk [serve|verify]", other);
        }
    }

    Ok(())
}

/// Run the HTTP API
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting Gatewalk HTTP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Data directory: {}", config.data_dir().display());

    let service = Arc::new(RouteService::from_config(&config)?);
    let airports = service.list_airports()?;
    log::info!("Serving {} airports", airports.len());

    let server = HttpServer::new(service, &config);
    server.run(config.http_server.port).await?;

    Ok(())
}

/// Build every floor graph and report what was found
async fn run_verification(config: Config) -> Result<()> {
    log::info!("Starting Gatewalk v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Configuration loaded successfully");
    log::info!("Data directory: {}", config.data_dir().display());
    log::info!("Walking speed: {} m/s", config.routing.walking_speed_mps);

    let service = RouteService::from_config(&config)?;
    let reports = tokio::task::spawn_blocking(move || service.verify()).await??;

    if reports.is_empty() {
        log::warn!("No floors found. Check data_dir in config.toml.");
        return Ok(());
    }

    let mut dropped_total = 0;
    for report in &reports {
        if report.dropped_connections > 0 {
            log::warn!(
                "{}/{}: {} points, {} edges, {} dropped connections",
                report.airport,
                report.floor,
                report.points,
                report.edges,
                report.dropped_connections
            );
        } else {
            log::info!(
                "✓ {}/{}: {} points, {} edges",
                report.airport,
                report.floor,
                report.points,
                report.edges
            );
        }
        dropped_total += report.dropped_connections;
    }

    log::info!(
        "✓ Verified {} floors ({} dropped connections)",
        reports.len(),
        dropped_total
    );
    Ok(())
}
