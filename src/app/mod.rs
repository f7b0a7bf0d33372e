// Application layer: ports to the outside world and the use cases built on them

pub mod export_use_case;
pub mod ports;
pub mod tracking_use_case;

pub use tracking_use_case::TrackingUseCase;
