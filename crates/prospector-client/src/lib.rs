pub mod config;
pub mod status;
pub mod status_json;

pub use config::{ClientConfig, ServerEntry, SessionConfig};
pub use status::{FailureReason, SessionState, StatusSession};
pub use status_json::{flatten_text, JsonStatusParser, ServerStatusInfo, StatusJsonError, StatusJsonParser};
