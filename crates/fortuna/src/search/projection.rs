//! Linear extrapolation of a very slow body toward a fixed longitude band.
//!
//! Used for multi-year cycles where hour-level refinement is pointless; the
//! result is always marked as an estimate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::angle;
use crate::config::SearchConfig;
use crate::events::{offset_days, AlignmentEvent, ResultKind};
use crate::motion::{MotionModel, SearchDirection};

const BAND_KIND: &str = "band_entry";

/// An arc of longitude from `low` forward to `high`; may wrap through 0°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBand {
    pub low: f64,
    pub high: f64,
}

impl TargetBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low: angle::normalize(low),
            high: angle::normalize(high),
        }
    }

    pub fn width(&self) -> f64 {
        angle::forward_distance(self.low, self.high)
    }

    pub fn contains(&self, position: f64) -> bool {
        angle::in_arc(position, self.low, self.high)
    }

    fn label(&self) -> String {
        format!("{:.2}°–{:.2}°", self.low, self.high)
    }
}

pub struct ProjectionEstimator<'a> {
    config: &'a SearchConfig,
}

impl<'a> ProjectionEstimator<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    pub fn estimate_crossing(
        &self,
        model: &MotionModel,
        band: TargetBand,
        epoch: DateTime<Utc>,
    ) -> AlignmentEvent {
        let label = band.label();

        if band.contains(model.current) {
            return AlignmentEvent::found(BAND_KIND, &model.id, label, SearchDirection::Future, epoch, 0.0)
                .with_applying(false)
                .with_description(format!("{} already inside {}", model.id, band.label()))
                .estimated();
        }

        if model.is_stationary(self.config.stationary_epsilon) {
            return AlignmentEvent::unresolved(
                ResultKind::Stationary,
                BAND_KIND,
                &model.id,
                label,
                SearchDirection::Future,
            )
            .estimated();
        }

        let rate = model.signed_rate();
        // The edge met first depends on which way the body is moving
        let (entry_edge, exit_edge, entry_name) = if rate > 0.0 {
            (band.low, band.high, "low")
        } else {
            (band.high, band.low, "high")
        };

        let entry_days = angle::distance_along_motion(model.current, entry_edge, rate) / model.daily_rate;
        let exit_days = entry_days + band.width() / model.daily_rate;
        let horizon = self.config.projection_horizon_days;
        let bounded = |days: f64| (days <= horizon).then(|| offset_days(epoch, days)).flatten();
        let (Some(entry), Some(exit)) = (bounded(entry_days), bounded(exit_days)) else {
            log::debug!(
                "{}: entry into {} is {entry_days:.0} days out, past the {horizon} day projection horizon",
                model.id,
                band.label()
            );
            return AlignmentEvent::unresolved(
                ResultKind::NotFoundWithinHorizon,
                BAND_KIND,
                &model.id,
                label,
                SearchDirection::Future,
            )
            .estimated();
        };

        log::debug!(
            "{}: projected entry into {} in {entry_days:.0} days",
            model.id,
            band.label()
        );

        AlignmentEvent::found(BAND_KIND, &model.id, label, SearchDirection::Future, entry, entry_days)
            .with_distance(angle::angular_distance(model.current, entry_edge))
            .with_description(format!(
                "projected entry at {entry_edge:.2}° ({entry_name} edge) around {}; exit at {exit_edge:.2}° around {}",
                entry.format("%Y-%m-%d"),
                exit.format("%Y-%m-%d"),
            ))
            .estimated()
    }
}
