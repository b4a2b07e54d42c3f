//! Engine-wide search configuration.
//!
//! Horizons, orbs and grid resolutions all live here and are passed into
//! each search explicitly.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::motion::SearchDirection;

/// Upper bound on `default_window_minutes` (one day each side).
pub const MAX_DEFAULT_WINDOW_MINUTES: i64 = 1440;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum days a future search looks ahead.
    pub future_horizon_days: f64,
    /// Maximum days a past search looks back.
    pub past_horizon_days: f64,
    /// Daily rates at or below this are treated as stationary.
    pub stationary_epsilon: f64,
    /// Hourly steps scanned by the compound search.
    pub compound_hour_steps: u32,
    /// Minutes a fast cyclical reference spends per degree of orb.
    pub fast_minutes_per_degree: f64,
    /// Daily rate assumed for chart angles used as fast references.
    pub fast_reference_daily_rate: f64,
    pub coarse_step_minutes: u32,
    pub coarse_orb: f64,
    pub fine_step_minutes: u32,
    pub fine_orb: f64,
    /// Half-width of the fine scan around each coarse match.
    pub fine_window_minutes: u32,
    /// Half-width of the window assumed for events without one.
    pub default_window_minutes: i64,
    /// Furthest a band projection may reach, entry and exit both.
    pub projection_horizon_days: f64,
    /// Point-in-time tolerance for cross-list stacking.
    pub stack_tolerance_hours: f64,
    /// Offset of the shadow point from its primary reference.
    pub shadow_offset_deg: f64,
    pub include_shadow_points: bool,
    pub include_past: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            future_horizon_days: 1095.0,
            past_horizon_days: 1095.0,
            stationary_epsilon: 1e-9,
            compound_hour_steps: 48,
            fast_minutes_per_degree: 4.0,
            fast_reference_daily_rate: 360.0,
            coarse_step_minutes: 4,
            coarse_orb: 1.0,
            fine_step_minutes: 1,
            fine_orb: 0.25,
            fine_window_minutes: 5,
            default_window_minutes: 5,
            projection_horizon_days: 36525.0,
            stack_tolerance_hours: 2.0,
            shadow_offset_deg: 180.0,
            include_shadow_points: true,
            include_past: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.future_horizon_days) {
            return Err(SearchError::InvalidConfig("future_horizon_days must be positive"));
        }
        if !positive(self.past_horizon_days) {
            return Err(SearchError::InvalidConfig("past_horizon_days must be positive"));
        }
        if !self.stationary_epsilon.is_finite() || self.stationary_epsilon < 0.0 {
            return Err(SearchError::InvalidConfig("stationary_epsilon must be >= 0"));
        }
        if self.compound_hour_steps == 0 {
            return Err(SearchError::InvalidConfig("compound_hour_steps must be > 0"));
        }
        if !positive(self.fast_minutes_per_degree) {
            return Err(SearchError::InvalidConfig("fast_minutes_per_degree must be positive"));
        }
        if !positive(self.fast_reference_daily_rate) {
            return Err(SearchError::InvalidConfig("fast_reference_daily_rate must be positive"));
        }
        if self.coarse_step_minutes == 0 || self.fine_step_minutes == 0 {
            return Err(SearchError::InvalidConfig("grid steps must be > 0 minutes"));
        }
        if self.fine_step_minutes > self.coarse_step_minutes {
            return Err(SearchError::InvalidConfig("fine step must not exceed coarse step"));
        }
        if !positive(self.coarse_orb) || !positive(self.fine_orb) {
            return Err(SearchError::InvalidConfig("time-search orbs must be positive"));
        }
        if !(0..=MAX_DEFAULT_WINDOW_MINUTES).contains(&self.default_window_minutes) {
            return Err(SearchError::InvalidConfig("default_window_minutes must be within 0..=1440"));
        }
        if !positive(self.projection_horizon_days) {
            return Err(SearchError::InvalidConfig("projection_horizon_days must be positive"));
        }
        if !self.stack_tolerance_hours.is_finite() || self.stack_tolerance_hours < 0.0 {
            return Err(SearchError::InvalidConfig("stack_tolerance_hours must be >= 0"));
        }
        if !self.shadow_offset_deg.is_finite() {
            return Err(SearchError::InvalidConfig("shadow_offset_deg must be finite"));
        }
        Ok(())
    }

    /// Horizon for the given search direction.
    pub fn horizon_days(&self, direction: SearchDirection) -> f64 {
        match direction {
            SearchDirection::Future => self.future_horizon_days,
            SearchDirection::Past => self.past_horizon_days,
        }
    }
}
