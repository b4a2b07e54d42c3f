pub mod compound;
pub mod locator;
pub mod projection;
pub mod two_pass;

pub use compound::CompoundSearch;
pub use locator::AspectLocator;
pub use projection::{ProjectionEstimator, TargetBand};
pub use two_pass::{find_crossing_time, linear_position, TimeResult, TwoPassParams};
