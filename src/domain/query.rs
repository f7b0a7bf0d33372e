use crate::common::constants::PARAM_ENTITY_TYPE;
use crate::common::error::MovebankError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of record requested from Movebank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Study,
    TagType,
    Event,
    Individual,
    Sensor,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Study => "study",
            EntityType::TagType => "tag_type",
            EntityType::Event => "event",
            EntityType::Individual => "individual",
            EntityType::Sensor => "sensor",
        }
    }

    pub fn all() -> [EntityType; 5] {
        [
            EntityType::Study,
            EntityType::TagType,
            EntityType::Event,
            EntityType::Individual,
            EntityType::Sensor,
        ]
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = MovebankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MovebankError::invalid_field(PARAM_ENTITY_TYPE, format!("unknown entity type '{s}'")))
    }
}

/// A single logical query: entity type plus filter parameters, in the order given.
///
/// Built once through the consuming builder methods and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery {
    entity_type: EntityType,
    filters: Vec<(String, String)>,
}

impl EntityQuery {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((name.into(), value.to_string()));
        self
    }

    pub fn filters_from<I, K, V>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        filters.into_iter().fold(self, |q, (k, v)| q.filter(k, v))
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Query parameters as sent upstream: `entity_type` first, then every filter.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 1);
        params.push((PARAM_ENTITY_TYPE.to_string(), self.entity_type.as_str().to_string()));
        params.extend(self.filters.iter().cloned());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_parses_wire_names() {
        assert_eq!("tag_type".parse::<EntityType>().unwrap(), EntityType::TagType);
        assert_eq!("study".parse::<EntityType>().unwrap(), EntityType::Study);
        assert!("tracks".parse::<EntityType>().is_err());
    }

    #[test]
    fn params_lead_with_entity_type_and_keep_filter_order() {
        let query = EntityQuery::new(EntityType::Event)
            .filter("study_id", 42)
            .filter("attributes", "timestamp,location_lat");

        let params = query.to_params();
        assert_eq!(params[0], ("entity_type".to_string(), "event".to_string()));
        assert_eq!(params[1], ("study_id".to_string(), "42".to_string()));
        assert_eq!(params[2].0, "attributes");
        assert_eq!(params.len(), 3);
    }
}
