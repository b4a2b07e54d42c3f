//! Coarse-then-fine time-of-day search for a fast-rotating reference
//! crossing a fixed absolute longitude.
//!
//! Pass 1 samples the whole UTC day on a coarse grid; pass 2 rescans a
//! small neighbourhood of every coarse hit minute by minute. When pass 2
//! finds nothing tight enough, the closest coarse sample is returned and
//! flagged as approximate.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::angle;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::motion::MotionModel;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Grid resolutions and orbs for the two passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPassParams {
    pub coarse_step_minutes: u32,
    pub coarse_orb: f64,
    pub fine_step_minutes: u32,
    pub fine_orb: f64,
    /// Half-width of the fine scan around each coarse match.
    pub fine_window_minutes: u32,
}

impl TwoPassParams {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            coarse_step_minutes: config.coarse_step_minutes,
            coarse_orb: config.coarse_orb,
            fine_step_minutes: config.fine_step_minutes,
            fine_orb: config.fine_orb,
            fine_window_minutes: config.fine_window_minutes,
        }
    }
}

impl Default for TwoPassParams {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Best crossing time found for a day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeResult {
    pub time: DateTime<Utc>,
    pub distance_deg: f64,
    /// True when only the coarse pass produced a candidate
    pub is_approximate: bool,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    minute: i64,
    distance: f64,
}

/// Find when `position_at` crosses `target` during `date` (UTC).
///
/// Fails with [`SearchError::NoCrossing`] when no coarse sample lands within
/// the coarse orb; any time returned then would be meaningless.
pub fn find_crossing_time<F>(
    date: NaiveDate,
    target: f64,
    params: &TwoPassParams,
    position_at: F,
) -> Result<TimeResult, SearchError>
where
    F: Fn(DateTime<Utc>) -> f64,
{
    if params.coarse_step_minutes == 0 || params.fine_step_minutes == 0 {
        return Err(SearchError::InvalidConfig("grid steps must be > 0 minutes"));
    }

    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let sample = |minute: i64| Sample {
        minute,
        distance: angle::angular_distance(position_at(midnight + Duration::minutes(minute)), target),
    };

    // Pass 1: coarse grid over the whole day
    let mut coarse_hits = Vec::new();
    let mut closest: Option<Sample> = None;
    for minute in (0..MINUTES_PER_DAY).step_by(params.coarse_step_minutes as usize) {
        let s = sample(minute);
        if closest.map_or(true, |c| s.distance < c.distance) {
            closest = Some(s);
        }
        if s.distance <= params.coarse_orb {
            coarse_hits.push(s);
        }
    }

    let closest = match closest {
        Some(c) if !coarse_hits.is_empty() => c,
        _ => {
            log::debug!(
                "no coarse sample within {}° of {target:.2}° on {date} (closest {:.2}°)",
                params.coarse_orb,
                closest.map_or(f64::NAN, |c| c.distance)
            );
            return Err(SearchError::NoCrossing {
                date,
                target,
                orb: params.coarse_orb,
            });
        }
    };

    // Pass 2: fine scan around every coarse hit
    let window = i64::from(params.fine_window_minutes);
    let mut best: Option<Sample> = None;
    for hit in &coarse_hits {
        let from = (hit.minute - window).max(0);
        let to = (hit.minute + window).min(MINUTES_PER_DAY - 1);
        for minute in (from..=to).step_by(params.fine_step_minutes as usize) {
            let s = sample(minute);
            if s.distance <= params.fine_orb && best.map_or(true, |b| s.distance < b.distance) {
                best = Some(s);
            }
        }
    }

    let (chosen, is_approximate) = match best {
        Some(b) => (b, false),
        None => (closest, true),
    };

    log::trace!(
        "crossing of {target:.2}° on {date}: minute {} ({:.3}°, approximate={is_approximate})",
        chosen.minute,
        chosen.distance
    );

    Ok(TimeResult {
        time: midnight + Duration::minutes(chosen.minute),
        distance_deg: chosen.distance,
        is_approximate,
    })
}

/// Position function for a linearly moving point sampled at `epoch`.
pub fn linear_position(model: &MotionModel, epoch: DateTime<Utc>) -> impl Fn(DateTime<Utc>) -> f64 + '_ {
    move |t| {
        let days = (t - epoch).num_milliseconds() as f64 / 86_400_000.0;
        model.position_after(days)
    }
}
