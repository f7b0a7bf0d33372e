use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use movebank_tracker::app::export_use_case::{export_study, ExportOptions};
use movebank_tracker::app::TrackingUseCase;
use movebank_tracker::client::EntityQueryClient;
use movebank_tracker::config::Config;
use movebank_tracker::domain::acceleration::{AccelerationUnit, Sensitivity};
use movebank_tracker::domain::query::{EntityQuery, EntityType};
use movebank_tracker::observability::{self, metrics};
use movebank_tracker::server::{start_server, AppState};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "movebank_tracker")]
#[command(about = "Movebank animal-tracking data pipeline and map API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the study and track API
    Serve {
        /// Port to listen on (overrides PORT and config.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the downloadable studies as JSON
    Studies,
    /// Print the reduced track of one study as JSON
    Events {
        study_id: String,
    },
    /// Run a raw entity query and print the normalized records as JSON
    Query {
        /// study, tag_type, event, individual or sensor
        entity_type: String,
        /// Extra filters as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Export visible studies, the sensor-filtered subset, individuals and their events for one study
    Export {
        study_id: String,
        /// Sensor name used to filter studies
        #[arg(long, default_value = "GPS")]
        sensor: String,
        #[arg(long, value_enum, default_value_t = UnitArg::Ms2)]
        unit: UnitArg,
        #[arg(long)]
        low_sensitivity: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Ms2,
    G,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{s}'"))?;
    Ok((k.to_string(), v.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load().context("loading configuration")?;
    let client = EntityQueryClient::from_config(&config.movebank)?;
    let tracking = TrackingUseCase::new(client, config.movebank.reduction_profile.clone());

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Err(e) = metrics::init() {
                warn!("Metrics disabled: {}", e);
            }
            start_server(AppState { tracking }, config.server.port).await?;
        }
        Commands::Studies => {
            let studies = tracking.fetch_studies().await?;
            info!("Fetched {} studies", studies.len());
            print_json(&studies)?;
        }
        Commands::Events { study_id } => {
            let events = tracking.fetch_study_events(&study_id).await?;
            info!(study_id = %study_id, "Fetched {} events", events.len());
            print_json(&events)?;
        }
        Commands::Query { entity_type, params } => {
            let entity_type: EntityType = entity_type.parse()?;
            let query = EntityQuery::new(entity_type).filters_from(params);
            let records = tracking.client().query(&query).await?;
            print_json(&records)?;
        }
        Commands::Export {
            study_id,
            sensor,
            unit,
            low_sensitivity,
        } => {
            let unit = match unit {
                UnitArg::Ms2 => AccelerationUnit::MetersPerSecondSquared,
                UnitArg::G => AccelerationUnit::G,
            };
            let sensitivity = if low_sensitivity { Sensitivity::Low } else { Sensitivity::High };
            let options = ExportOptions { unit, sensitivity };
            let data = export_study(&tracking, &study_id, &sensor, options).await?;
            print_json(&data)?;
        }
    }
    Ok(())
}
