use crate::client::EntityQueryClient;
use crate::common::constants::{
    PARAM_ATTRIBUTES, PARAM_CAN_SEE_DATA, PARAM_DOWNLOAD_ACCESS, PARAM_EVENT_REDUCTION_PROFILE, PARAM_HIDDEN_DATA,
    PARAM_INDIVIDUAL_ID, PARAM_SENSOR_TYPE_ID, PARAM_STUDY_ID, TRACK_ATTRIBUTES,
};
use crate::common::error::Result;
use crate::domain::query::{EntityQuery, EntityType};
use crate::domain::{project, Individual, NormalizedRecord, Study, StudyEvent, TagType};
use tracing::{debug, instrument};

/// Composes entity queries for the map: study list, study tracks and the
/// per-individual lookups used by the exporter.
#[derive(Clone)]
pub struct TrackingUseCase {
    client: EntityQueryClient,
    reduction_profile: String,
}

impl TrackingUseCase {
    pub fn new(client: EntityQueryClient, reduction_profile: impl Into<String>) -> Self {
        Self {
            client,
            reduction_profile: reduction_profile.into(),
        }
    }

    pub fn client(&self) -> &EntityQueryClient {
        &self.client
    }

    /// Studies the account may download, projected to id, name and main location.
    #[instrument(skip(self))]
    pub async fn fetch_studies(&self) -> Result<Vec<Study>> {
        let query = EntityQuery::new(EntityType::Study).filter(PARAM_DOWNLOAD_ACCESS, "true");
        let records = self.client.query(&query).await?;
        project(&records)
    }

    /// Reduced track for one study: timestamp, coordinates and individual id.
    #[instrument(skip(self))]
    pub async fn fetch_study_events(&self, study_id: &str) -> Result<Vec<StudyEvent>> {
        let query = EntityQuery::new(EntityType::Event)
            .filter(PARAM_STUDY_ID, study_id)
            .filter(PARAM_ATTRIBUTES, TRACK_ATTRIBUTES)
            .filter(PARAM_EVENT_REDUCTION_PROFILE, &self.reduction_profile);
        let records = self.client.query(&query).await?;
        project(&records)
    }

    pub async fn fetch_tag_types(&self) -> Result<Vec<TagType>> {
        let records = self.client.query(&EntityQuery::new(EntityType::TagType)).await?;
        project(&records)
    }

    /// Full study rows for studies whose data is entirely visible to the account.
    pub async fn fetch_visible_studies(&self) -> Result<Vec<NormalizedRecord>> {
        let query = EntityQuery::new(EntityType::Study)
            .filter(PARAM_CAN_SEE_DATA, "true")
            .filter(PARAM_HIDDEN_DATA, "false");
        let records = self.client.query(&query).await?;
        let total = records.len();
        let visible: Vec<NormalizedRecord> = records.into_iter().filter(is_fully_visible).collect();
        debug!("{} of {} studies fully visible", visible.len(), total);
        Ok(visible)
    }

    pub async fn fetch_individuals(&self, study_id: &str) -> Result<Vec<Individual>> {
        let query = EntityQuery::new(EntityType::Individual).filter(PARAM_STUDY_ID, study_id);
        let records = self.client.query(&query).await?;
        project(&records)
    }

    /// Every attribute of one individual's events for a sensor type.
    pub async fn fetch_individual_events(
        &self,
        study_id: &str,
        individual_id: &str,
        sensor_type_id: u64,
    ) -> Result<Vec<NormalizedRecord>> {
        let query = EntityQuery::new(EntityType::Event)
            .filter(PARAM_STUDY_ID, study_id)
            .filter(PARAM_INDIVIDUAL_ID, individual_id)
            .filter(PARAM_SENSOR_TYPE_ID, sensor_type_id)
            .filter(PARAM_ATTRIBUTES, "all");
        self.client.query(&query).await
    }
}

fn is_fully_visible(record: &NormalizedRecord) -> bool {
    record.get(PARAM_CAN_SEE_DATA).map(String::as_str) == Some("true")
        && record.get(PARAM_HIDDEN_DATA).map(String::as_str) == Some("false")
}

/// Studies whose `sensor_type_ids` column mentions `sensor` (e.g. "GPS").
pub fn studies_by_sensor<'a>(studies: &'a [NormalizedRecord], sensor: &str) -> Vec<&'a NormalizedRecord> {
    studies
        .iter()
        .filter(|s| s.get("sensor_type_ids").is_some_and(|ids| ids.contains(sensor)))
        .collect()
}
