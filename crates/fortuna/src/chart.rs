//! Chart data handed over by the ephemeris and natal-chart collaborators.
//!
//! Lookups never fall back to another body: anything missing is reported
//! as [`SearchError::UpstreamDataMissing`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::angle;
use crate::error::SearchError;
use crate::motion::{Direction, MotionModel};

/// Planetary position data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Latitude in degrees
    #[serde(default)]
    pub lat: f64,
    /// Speed in longitude (degrees per day)
    pub speed_lon: f64,
    /// Whether the planet is retrograde
    #[serde(default)]
    pub retrograde: bool,
}

/// House system positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousePositions {
    /// House system name
    pub system: String,
    /// House cusps: "1".."12" -> degrees
    #[serde(default)]
    pub cusps: HashMap<String, f64>,
    /// Angles: "asc", "mc", "ic", "dc" -> degrees
    #[serde(default)]
    pub angles: HashMap<String, f64>,
}

/// Complete position data for a chart layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerPositions {
    /// Layer name used in error reports ("natal", "transit", ...)
    #[serde(default)]
    pub layer_id: String,
    /// Planet ID -> position
    pub planets: HashMap<String, PlanetPosition>,
    /// House positions (None if no location provided)
    #[serde(default)]
    pub houses: Option<HousePositions>,
}

impl LayerPositions {
    fn missing(&self, object: &str) -> SearchError {
        log::warn!("{} chart has no {object}", self.layer_id);
        SearchError::UpstreamDataMissing {
            layer: self.layer_id.clone(),
            object: object.to_string(),
        }
    }

    /// Motion model for a planet; retrograde if flagged or moving backward.
    pub fn motion(&self, id: &str) -> Result<MotionModel, SearchError> {
        let p = self.planets.get(id).ok_or_else(|| self.missing(id))?;
        let direction = if p.retrograde || p.speed_lon < 0.0 {
            Direction::Retrograde
        } else {
            Direction::Direct
        };
        Ok(MotionModel::new(id, p.lon, p.speed_lon.abs(), direction))
    }

    /// Fixed longitude of a planet or chart angle.
    pub fn reference(&self, id: &str) -> Result<f64, SearchError> {
        if let Some(p) = self.planets.get(id) {
            return Ok(angle::normalize(p.lon));
        }
        self.houses
            .as_ref()
            .and_then(|h| h.angles.get(id).or_else(|| h.cusps.get(id)))
            .map(|lon| angle::normalize(*lon))
            .ok_or_else(|| self.missing(id))
    }

    /// Angle ("asc", "mc", ...) cycling once per sidereal day.
    pub fn cycling_angle(&self, id: &str, daily_rate: f64) -> Result<MotionModel, SearchError> {
        let lon = self
            .houses
            .as_ref()
            .and_then(|h| h.angles.get(id))
            .ok_or_else(|| self.missing(id))?;
        Ok(MotionModel::new(id, *lon, daily_rate, Direction::Direct))
    }
}
