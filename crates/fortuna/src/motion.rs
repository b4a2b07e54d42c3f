//! Linear motion model for a single moving point.

use serde::{Deserialize, Serialize};

use crate::angle;

/// Apparent direction of motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Direct,
    Retrograde,
}

/// Which way in time a search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDirection {
    Future,
    Past,
}

impl SearchDirection {
    /// +1 for future searches, -1 for past searches.
    pub fn sign(self) -> f64 {
        match self {
            Self::Future => 1.0,
            Self::Past => -1.0,
        }
    }
}

/// Effective signed degrees per day covered when walking in
/// `search_direction`.
///
/// A direct body searched into the past moves backward, exactly like a
/// retrograde body searched into the future. All locators derive their
/// travel direction from this one function.
pub fn signed_daily_delta(rate: f64, direction: Direction, search_direction: SearchDirection) -> f64 {
    let motion_sign = match direction {
        Direction::Direct => 1.0,
        Direction::Retrograde => -1.0,
    };
    rate.abs() * motion_sign * search_direction.sign()
}

/// A moving point: position, unsigned daily rate and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionModel {
    /// Body or point identifier ("jupiter", "asc", ...)
    pub id: String,
    /// Current longitude in degrees [0, 360)
    pub current: f64,
    /// Magnitude of daily motion in degrees
    pub daily_rate: f64,
    pub direction: Direction,
}

impl MotionModel {
    pub fn new(id: impl Into<String>, current: f64, daily_rate: f64, direction: Direction) -> Self {
        Self {
            id: id.into(),
            current: angle::normalize(current),
            daily_rate: daily_rate.abs(),
            direction,
        }
    }

    /// Build from an ephemeris-style signed speed (negative = retrograde).
    pub fn from_signed_speed(id: impl Into<String>, current: f64, speed: f64) -> Self {
        let direction = if speed < 0.0 {
            Direction::Retrograde
        } else {
            Direction::Direct
        };
        Self::new(id, current, speed.abs(), direction)
    }

    /// Signed degrees per day in forward time.
    pub fn signed_rate(&self) -> f64 {
        signed_daily_delta(self.daily_rate, self.direction, SearchDirection::Future)
    }

    pub fn is_retrograde(&self) -> bool {
        self.direction == Direction::Retrograde
    }

    /// Whether the rate is too small to search with.
    pub fn is_stationary(&self, epsilon: f64) -> bool {
        self.daily_rate <= epsilon
    }

    /// Position after `days` (negative = earlier) of linear motion.
    pub fn position_after(&self, days: f64) -> f64 {
        angle::normalize(self.current + self.signed_rate() * days)
    }
}
