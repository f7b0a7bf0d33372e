use crate::app::tracking_use_case::{studies_by_sensor, TrackingUseCase};
use crate::common::constants::{ACCELERATION_SENSOR_TYPE_ID, GPS_SENSOR_TYPE_ID};
use crate::common::error::Result;
use crate::domain::acceleration::{transform_raw_acceleration, AccelerationSample, AccelerationUnit, Sensitivity};
use crate::domain::{project, GpsFix, Individual, NormalizedRecord};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Everything the exporter writes for one study.
#[derive(Debug, Clone, Serialize)]
pub struct StudyExport {
    /// Every fully visible study, unfiltered.
    pub all_studies: Vec<NormalizedRecord>,
    /// The visible studies that carry the requested sensor.
    pub gps_studies: Vec<NormalizedRecord>,
    pub individuals: Vec<Individual>,
    pub gps_events: Vec<GpsFix>,
    pub acc_events: Vec<AccelerationSample>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub unit: AccelerationUnit,
    pub sensitivity: Sensitivity,
}

/// Study lists plus the GPS and acceleration events of the study's first
/// individual.
#[instrument(skip(tracking, options))]
pub async fn export_study(
    tracking: &TrackingUseCase,
    study_id: &str,
    sensor: &str,
    options: ExportOptions,
) -> Result<StudyExport> {
    let all_studies = tracking.fetch_visible_studies().await?;
    let gps_studies: Vec<NormalizedRecord> = studies_by_sensor(&all_studies, sensor).into_iter().cloned().collect();
    info!("{} visible studies, {} with sensor {}", all_studies.len(), gps_studies.len(), sensor);
    let individuals = tracking.fetch_individuals(study_id).await?;

    let mut gps_events = Vec::new();
    let mut acc_events = Vec::new();
    if let Some(first) = individuals.first() {
        let gps = tracking
            .fetch_individual_events(study_id, &first.id, GPS_SENSOR_TYPE_ID)
            .await?;
        gps_events = project::<GpsFix>(&gps)?;

        let acc = tracking
            .fetch_individual_events(study_id, &first.id, ACCELERATION_SENSOR_TYPE_ID)
            .await?;
        acc_events = transform_raw_acceleration(&acc, options.unit, options.sensitivity)?;
    } else {
        warn!(study_id, "Study has no individuals");
    }

    Ok(StudyExport {
        all_studies,
        gps_studies,
        individuals,
        gps_events,
        acc_events,
    })
}
