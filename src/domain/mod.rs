pub mod acceleration;
pub mod query;

use crate::common::error::{MovebankError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One CSV body row: header name -> raw string value, in header order.
pub type NormalizedRecord = IndexMap<String, String>;

fn field(record: &NormalizedRecord, name: &str) -> Result<String> {
    record
        .get(name)
        .cloned()
        .ok_or_else(|| MovebankError::MissingField(name.to_string()))
}

/// Parse a coordinate string; anything that is not a finite number is absent.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Study projection served to the map: exactly the four upstream columns,
/// string-for-string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    pub id: String,
    pub name: String,
    pub main_location_lat: String,
    pub main_location_long: String,
}

impl Study {
    pub const FIELDS: [&'static str; 4] = ["id", "name", "main_location_lat", "main_location_long"];

    pub fn latitude(&self) -> Option<f64> {
        parse_coordinate(&self.main_location_lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        parse_coordinate(&self.main_location_long)
    }
}

impl TryFrom<&NormalizedRecord> for Study {
    type Error = MovebankError;

    fn try_from(record: &NormalizedRecord) -> Result<Self> {
        Ok(Self {
            id: field(record, "id")?,
            name: field(record, "name")?,
            main_location_lat: field(record, "main_location_lat")?,
            main_location_long: field(record, "main_location_long")?,
        })
    }
}

/// Track point of a study, as requested with the reduced attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyEvent {
    pub timestamp: String,
    pub location_long: String,
    pub location_lat: String,
    pub individual_id: String,
}

impl StudyEvent {
    pub fn latitude(&self) -> Option<f64> {
        parse_coordinate(&self.location_lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        parse_coordinate(&self.location_long)
    }
}

impl TryFrom<&NormalizedRecord> for StudyEvent {
    type Error = MovebankError;

    fn try_from(record: &NormalizedRecord) -> Result<Self> {
        Ok(Self {
            timestamp: field(record, "timestamp")?,
            location_long: field(record, "location_long")?,
            location_lat: field(record, "location_lat")?,
            individual_id: field(record, "individual_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    pub id: String,
    pub local_identifier: Option<String>,
    pub taxon_canonical_name: Option<String>,
}

impl TryFrom<&NormalizedRecord> for Individual {
    type Error = MovebankError;

    fn try_from(record: &NormalizedRecord) -> Result<Self> {
        Ok(Self {
            id: field(record, "id")?,
            local_identifier: record.get("local_identifier").cloned(),
            taxon_canonical_name: record.get("taxon_canonical_name").cloned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagType {
    pub id: String,
    pub name: String,
    pub external_id: Option<String>,
}

impl TryFrom<&NormalizedRecord> for TagType {
    type Error = MovebankError;

    fn try_from(record: &NormalizedRecord) -> Result<Self> {
        Ok(Self {
            id: field(record, "id")?,
            name: field(record, "name")?,
            external_id: record.get("external_id").cloned(),
        })
    }
}

/// GPS event reduced to (timestamp, deployment, lat, long). Empty or unparsable
/// coordinates are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub timestamp: String,
    pub deployment_id: String,
    pub location_lat: Option<f64>,
    pub location_long: Option<f64>,
}

impl TryFrom<&NormalizedRecord> for GpsFix {
    type Error = MovebankError;

    fn try_from(record: &NormalizedRecord) -> Result<Self> {
        let lat = field(record, "location_lat")?;
        let long = field(record, "location_long")?;
        let fix = Self {
            timestamp: field(record, "timestamp")?,
            deployment_id: field(record, "deployment_id")?,
            location_lat: parse_coordinate(&lat),
            location_long: parse_coordinate(&long),
        };
        if (!lat.is_empty() && fix.location_lat.is_none()) || (!long.is_empty() && fix.location_long.is_none()) {
            tracing::debug!(timestamp = %fix.timestamp, "Could not parse long/lat");
        }
        Ok(fix)
    }
}

/// Map every record through `T::try_from`, stopping at the first missing column.
pub fn project<T>(records: &[NormalizedRecord]) -> Result<Vec<T>>
where
    T: for<'a> TryFrom<&'a NormalizedRecord, Error = MovebankError>,
{
    records.iter().map(T::try_from).collect()
}
