//! Alignment search and event-stacking engine for lucky-time forecasts.
//!
//! Bodies are modelled as a position moving at a constant daily rate. The
//! searches answer *when* an aspect to a fixed reference becomes exact,
//! how long it stays within orb, and which of the resulting events pile up
//! on each other in time. True ephemeris positions come from the caller;
//! nothing here performs I/O.

pub mod angle;
pub mod aspects;
pub mod chart;
pub mod config;
pub mod error;
pub mod events;
pub mod forecast;
pub mod motion;
pub mod search;
pub mod stacking;

pub use aspects::{AspectCalculator, AspectCatalog, AspectDefinition, AspectMatch};
pub use chart::{HousePositions, LayerPositions, PlanetPosition};
pub use config::SearchConfig;
pub use error::SearchError;
pub use events::{AlignmentEvent, DurationWindow, ResultKind};
pub use forecast::{ForecastEngine, ForecastReport, ForecastRequest};
pub use motion::{signed_daily_delta, Direction, MotionModel, SearchDirection};
pub use search::{
    find_crossing_time, AspectLocator, CompoundSearch, ProjectionEstimator, TargetBand, TimeResult,
    TwoPassParams,
};
pub use stacking::{ExternalEvent, LinkTarget, StackDetector, StackEntry, StackLink, StackedGroup};
