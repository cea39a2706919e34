use anyhow::{Context, Result};
use clap::Parser;
use gatewalk::floor::{FloorData, FloorFormat};
use gatewalk::locate::StartPoint;
use gatewalk::routing::{self, RouteOptions};
use gatewalk::service::enhance_path;
use gatewalk::{Config, Graph, RouteRequest, RouteService};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "route")]
#[command(about = "Compute a walking route on an airport floor")]
struct Args {
    /// Start point id, or "current_location" (requires --airport)
    #[arg(long)]
    from: String,

    /// Destination point id
    #[arg(long)]
    to: String,

    /// Intermediate stop, visited in the order given (repeatable)
    #[arg(long = "stop")]
    stops: Vec<String>,

    /// Route on a standalone floor file instead of the configured data directory
    #[arg(long, conflicts_with = "airport")]
    floor_file: Option<PathBuf>,

    /// Airport code in the configured data directory
    #[arg(long, requires = "floor")]
    airport: Option<String>,

    /// Floor id within the airport
    #[arg(long)]
    floor: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "warn")
    ).init();

    let args = Args::parse();
    let started = Instant::now();

    let (path, distance, minutes, steps) = match (&args.floor_file, &args.airport, &args.floor) {
        (Some(file), _, _) => route_from_file(&args, file)?,
        (None, Some(airport), Some(floor)) => {
            let config = Config::load()?;
            let service = RouteService::from_config(&config)?;
            let request = RouteRequest {
                floor: floor.clone(),
                start: StartPoint::from(args.from.as_str()),
                end: args.to.clone(),
                stops: args.stops.clone(),
            };
            let response = service.plan_route(airport, &request)?;
            (
                response.path,
                response.distance,
                response.estimated_time_minutes,
                response.enhanced_path,
            )
        }
        _ => anyhow::bail!("Pass either --floor-file <path> or --airport <code> --floor <id>"),
    };

    let elapsed = started.elapsed();

    if args.json {
        let out = serde_json::json!({
            "path": path,
            "enhancedPath": steps,
            "distance": distance,
            "estimatedTimeMinutes": minutes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\nRoute: {} -> {}", args.from, args.to);
    if !args.stops.is_empty() {
        println!("Stops: {}", args.stops.join(", "));
    }
    println!("─────────────────────────────────────────────");
    for (i, step) in steps.iter().enumerate() {
        let name = step.name.as_deref().unwrap_or("");
        let kind = step.kind.as_deref().unwrap_or("");
        println!("{:>3}. {:<24} {:<20} {}", i + 1, step.id, name, kind);
    }
    println!("─────────────────────────────────────────────");
    println!("Distance: {:.1} m", distance);
    println!("Estimated walking time: {} min", minutes);
    println!("Computed in {:?}", elapsed);

    Ok(())
}

type Outcome = (Vec<String>, f64, u32, Vec<gatewalk::service::PathStep>);

/// Route directly on a floor document. No airport info is available here, so
/// the current-location sentinel is rejected.
fn route_from_file(args: &Args, file: &Path) -> Result<Outcome> {
    let start = match StartPoint::from(args.from.as_str()) {
        StartPoint::Point(id) => id,
        StartPoint::CurrentLocation => {
            anyhow::bail!("current_location needs --airport so the entrance can be resolved")
        }
    };

    let format = file
        .extension()
        .and_then(|e| e.to_str())
        .and_then(FloorFormat::from_extension)
        .unwrap_or(FloorFormat::Json);
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read floor file: {}", file.display()))?;
    let floor = FloorData::parse(&bytes, format)?;
    // Dropped connections are reported as warnings by the builder.
    let graph = Graph::from_floor(&floor);

    let route = routing::route(&graph, &start, &args.to, &args.stops, &RouteOptions::default())?;
    if !route.is_reachable() {
        anyhow::bail!("No valid route found from {} to {}", start, args.to);
    }

    let steps = enhance_path(&route.path, &floor);
    Ok((route.path, route.distance, route.estimated_time_minutes, steps))
}
