pub mod service;

pub use service::{IngestError, TelemetryIngest, TelemetryPayload};
