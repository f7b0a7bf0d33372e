/// Upstream service constants shared by the client, the use cases and the CLI.

pub const DEFAULT_BASE_URL: &str = "https://www.movebank.org/movebank/service";
pub const DIRECT_READ_PATH: &str = "direct-read";

/// Substring that marks a response body as a license-terms notice instead of CSV.
pub const LICENSE_MARKER: &str = "License Terms:";

// Query parameter names
pub const PARAM_ENTITY_TYPE: &str = "entity_type";
pub const PARAM_LICENSE_MD5: &str = "license-md5";
pub const PARAM_STUDY_ID: &str = "study_id";
pub const PARAM_INDIVIDUAL_ID: &str = "individual_id";
pub const PARAM_SENSOR_TYPE_ID: &str = "sensor_type_id";
pub const PARAM_ATTRIBUTES: &str = "attributes";
pub const PARAM_EVENT_REDUCTION_PROFILE: &str = "event_reduction_profile";
pub const PARAM_DOWNLOAD_ACCESS: &str = "i_have_download_access";
pub const PARAM_CAN_SEE_DATA: &str = "i_can_see_data";
pub const PARAM_HIDDEN_DATA: &str = "there_are_data_which_i_cannot_see";

/// Reduction profile collapsing a full track to one representative path.
pub const DEFAULT_REDUCTION_PROFILE: &str = "EURING_01";

pub const TRACK_ATTRIBUTES: &str = "timestamp,location_long,location_lat,individual_id";

// Sensor type ids
pub const GPS_SENSOR_TYPE_ID: u64 = 653;
pub const ACCELERATION_SENSOR_TYPE_ID: u64 = 2365683;

// Environment variables
pub const ENV_USERNAME: &str = "MOVEBANK_USERNAME";
pub const ENV_PASSWORD: &str = "MOVEBANK_PASSWORD";
pub const ENV_BASE_URL: &str = "MOVEBANK_BASE_URL";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Message returned to HTTP clients for any pipeline failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data from Movebank";
