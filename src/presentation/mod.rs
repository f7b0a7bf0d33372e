//! Map-ready views of studies and tracks.
//!
//! The browser map draws a marker per study and one polyline for the selected
//! study. Coordinates arrive as strings; anything that does not parse is left
//! off the map instead of failing the whole view.

use crate::domain::{Study, StudyEvent};
use crate::observability::metrics;
use serde::Serialize;
use std::fmt::Display;
use tracing::{error, warn};

pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyMarker {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLine {
    pub study_id: String,
    /// `[lat, lon]` pairs in upstream order.
    pub points: Vec<[f64; 2]>,
}

impl TrackLine {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn study_markers(studies: &[Study]) -> Vec<StudyMarker> {
    let mut skipped = 0;
    let markers: Vec<StudyMarker> = studies
        .iter()
        .filter_map(|study| match (study.latitude(), study.longitude()) {
            (Some(lat), Some(lon)) => Some(StudyMarker {
                id: study.id.clone(),
                name: study.name.clone(),
                lat,
                lon,
            }),
            _ => {
                warn!(
                    study_id = %study.id,
                    lat = %study.main_location_lat,
                    long = %study.main_location_long,
                    "Invalid coordinates for study"
                );
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        metrics::presentation::markers_skipped(skipped);
    }
    markers
}

pub fn track_line(study_id: &str, events: &[StudyEvent]) -> TrackLine {
    let points = events
        .iter()
        .filter_map(|e| Some([e.latitude()?, e.longitude()?]))
        .collect();
    TrackLine {
        study_id: study_id.to_string(),
        points,
    }
}

/// State behind the map: markers, the selected study and its track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapView {
    pub markers: Vec<StudyMarker>,
    pub selected_study: Option<String>,
    pub track: Option<TrackLine>,
    pub error: Option<String>,
}

impl MapView {
    /// Apply the result of the study list fetch. Failures collapse to the
    /// generic message; the cause goes to the log only.
    pub fn load_studies<E: Display>(&mut self, result: Result<Vec<Study>, E>) {
        match result {
            Ok(studies) => {
                self.markers = study_markers(&studies);
                self.error = None;
            }
            Err(e) => {
                error!("Error: {}", e);
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Apply the events of a selected study, replacing any previous track whole.
    pub fn select_study<E: Display>(&mut self, study_id: &str, result: Result<Vec<StudyEvent>, E>) {
        self.selected_study = Some(study_id.to_string());
        match result {
            Ok(events) => {
                let line = track_line(study_id, &events);
                self.track = if line.is_empty() { None } else { Some(line) };
                self.error = None;
            }
            Err(e) => {
                error!(study_id, "Error: {}", e);
                self.track = None;
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
    }
}
