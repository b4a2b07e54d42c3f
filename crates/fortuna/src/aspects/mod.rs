pub mod calculator;
pub mod types;

pub use calculator::{is_aspect_applying, AspectCalculator};
pub use types::{AspectCatalog, AspectDefinition, AspectMatch};
