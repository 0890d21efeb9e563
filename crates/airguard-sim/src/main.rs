//! airguard-sim - evaluate a drone mission and play it back headless

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airguard_core::{
    default_zones, parse_zones, Command, MissionController, Perturber, SettingsPatch,
    SimulatedWeather, WeatherSource, Zone,
};
use airguard_sim::args::Args;
use airguard_sim::config::Config;
use airguard_sim::runner::{self, log_event, Refresh, WeatherRefresher};
use airguard_sim::weather_file::FileWeather;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json)?;

    let args = Args::parse();
    tracing::info!(points = args.points.len(), "Starting airguard-sim");

    let zones: Arc<[Zone]> = match &args.zones {
        Some(path) => load_zones(path)?.into(),
        None => default_zones().into(),
    };

    let source: Box<dyn WeatherSource> = match (&args.weather, config.seed) {
        (Some(path), _) => Box::new(FileWeather::new(path)),
        (None, Some(seed)) => Box::new(SimulatedWeather::seeded(seed)),
        (None, None) => Box::new(SimulatedWeather::from_os_rng()),
    };
    let mut weather = WeatherRefresher::new(source, config.weather_retry_base);
    if let Refresh::Retry(delay) = weather.refresh() {
        tracing::warn!(
            retry_in_ms = delay.as_millis() as u64,
            "No weather yet, starting with calm conditions"
        );
    }

    let perturber = match config.seed {
        Some(seed) => Perturber::seeded(seed),
        None => Perturber::from_os_rng(),
    };
    let mut mission = MissionController::new(zones, weather.current().clone(), perturber);

    let settings = args.settings();
    let setup = [
        Command::SetPath(args.points.clone()),
        Command::UpdateSettings(SettingsPatch {
            altitude_m: Some(settings.altitude_m),
            weight_class: Some(settings.weight_class),
        }),
        Command::SetScenario(args.scenario.into()),
        Command::SetSpeed(args.speed),
        Command::SetFollowDrone(args.follow),
    ];
    for command in setup {
        mission.apply(command)?.iter().for_each(log_event);
    }

    let stats = mission.stats();
    tracing::info!(
        distance_km = stats.distance_km,
        estimated_minutes = stats.estimated_minutes,
        "Flight plan"
    );

    if let Some(path) = &args.save {
        let saved = mission.snapshot_mission(None);
        fs::write(path, serde_json::to_string_pretty(&saved)?)
            .with_context(|| format!("writing mission to {}", path.display()))?;
        tracing::info!(mission = %saved.name, path = %path.display(), "Mission saved");
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let summary = runner::run(&mut mission, &mut weather, &config, shutdown).await?;

    tracing::info!(summary = %serde_json::to_string(&summary)?, "Run finished");
    if let Some(analytics) = mission.analytics() {
        tracing::info!(
            flights = analytics.total_flights,
            avg_risk = analytics.avg_risk,
            approval_rate = analytics.approval_rate,
            "Session analytics"
        );
    }
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("airguard_sim=debug".parse()?)
        .add_directive("airguard_core=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

fn load_zones(path: &Path) -> Result<Vec<Zone>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading zones from {}", path.display()))?;
    let zones = parse_zones(&raw)?;
    tracing::info!(count = zones.len(), "Loaded zones");
    Ok(zones)
}
