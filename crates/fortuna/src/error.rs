use chrono::NaiveDate;
use thiserror::Error;

/// Hard failures raised by the engine.
///
/// Expected outcomes such as a stationary body or an exhausted horizon are
/// not errors; they come back as [`crate::events::ResultKind`] sentinels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("no sample within {orb}° of {target:.2}° on {date}")]
    NoCrossing { date: NaiveDate, target: f64, orb: f64 },
    #[error("missing {object} in {layer} chart data")]
    UpstreamDataMissing { layer: String, object: String },
    #[error("invalid search configuration: {0}")]
    InvalidConfig(&'static str),
}
