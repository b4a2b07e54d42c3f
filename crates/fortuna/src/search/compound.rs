//! Two slow bodies in mutual aspect while a fast daily-cycling reference
//! (ascendant-like) sits on one of them.
//!
//! The mutual aspect is located at day resolution by treating the A→B
//! separation as a point moving at the relative rate. Both bodies are then
//! frozen at that day and the fast reference is stepped hour by hour.

use chrono::{DateTime, Duration, Utc};

use crate::angle;
use crate::config::SearchConfig;
use crate::events::{offset_days, AlignmentEvent, DurationWindow, ResultKind};
use crate::motion::{MotionModel, SearchDirection};
use crate::search::locator::AspectLocator;

const COMPOUND_KIND: &str = "compound";

/// Mutual aspects the compound search looks for, in tie-break order.
const MUTUAL_ASPECTS: &[(&str, f64)] = &[("conjunction", 0.0), ("opposition", 180.0)];

pub struct CompoundSearch<'a> {
    config: &'a SearchConfig,
}

/// Day-level estimate of the next mutual aspect.
#[derive(Debug, Clone, PartialEq)]
struct MutualEstimate {
    aspect: &'static str,
    /// Whole days from the epoch
    day: f64,
}

impl<'a> CompoundSearch<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    pub fn find_compound(
        &self,
        body_a: &MotionModel,
        body_b: &MotionModel,
        fast_reference: &MotionModel,
        orb: f64,
        epoch: DateTime<Utc>,
    ) -> Vec<AlignmentEvent> {
        let pair_label = format!("{}/{}", body_a.id, body_b.id);

        if fast_reference.is_stationary(self.config.stationary_epsilon) {
            return vec![AlignmentEvent::unresolved(
                ResultKind::Stationary,
                COMPOUND_KIND,
                &fast_reference.id,
                pair_label,
                SearchDirection::Future,
            )];
        }

        let estimate = match self.mutual_estimate(body_a, body_b, orb, epoch) {
            Ok(estimate) => estimate,
            Err(kind) => {
                log::debug!("compound {pair_label}: no mutual aspect ({kind:?})");
                return vec![AlignmentEvent::unresolved(
                    kind,
                    COMPOUND_KIND,
                    &fast_reference.id,
                    pair_label,
                    SearchDirection::Future,
                )];
            }
        };

        let Some(day_start) = offset_days(epoch, estimate.day) else {
            return vec![AlignmentEvent::unresolved(
                ResultKind::NotFoundWithinHorizon,
                format!("{}+reference", estimate.aspect),
                &fast_reference.id,
                pair_label,
                SearchDirection::Future,
            )];
        };
        let projected = [
            (body_a, body_a.position_after(estimate.day)),
            (body_b, body_b.position_after(estimate.day)),
        ];

        let mut events = Vec::new();
        for (body, position) in projected {
            let hit = self
                .first_reference_hour(fast_reference, position, estimate.day, orb)
                .and_then(|(hour, distance)| {
                    let time = day_start.checked_add_signed(Duration::hours(i64::from(hour)))?;
                    Some((hour, distance, time))
                });
            if let Some((hour, distance, time)) = hit {
                let kind = format!("{}+reference_on_{}", estimate.aspect, body.id);
                log::debug!("compound {kind}: {} at {time}", fast_reference.id);
                events.push(
                    AlignmentEvent::found(
                        kind,
                        &fast_reference.id,
                        &body.id,
                        SearchDirection::Future,
                        time,
                        estimate.day + f64::from(hour) / 24.0,
                    )
                    .with_distance(distance)
                    .with_duration(DurationWindow::from_orb_minutes(
                        time,
                        orb,
                        self.config.fast_minutes_per_degree,
                    ))
                    .with_description(format!(
                        "{} {} {} while {} crosses {} at {:.2}°",
                        body_a.id, estimate.aspect, body_b.id, fast_reference.id, body.id, position
                    )),
                );
            }
        }

        if events.is_empty() {
            events.push(AlignmentEvent::unresolved(
                ResultKind::NotFoundWithinHorizon,
                format!("{}+reference", estimate.aspect),
                &fast_reference.id,
                pair_label,
                SearchDirection::Future,
            ));
        }
        events
    }

    /// Locate the next conjunction or opposition of A and B.
    fn mutual_estimate(
        &self,
        body_a: &MotionModel,
        body_b: &MotionModel,
        orb: f64,
        epoch: DateTime<Utc>,
    ) -> Result<MutualEstimate, ResultKind> {
        let separation = angle::forward_distance(body_a.current, body_b.current);
        let relative = MotionModel::from_signed_speed(
            format!("{}~{}", body_a.id, body_b.id),
            separation,
            body_b.signed_rate() - body_a.signed_rate(),
        );

        // A pair locked in orb is a day-0 hit even when the gap is not moving
        if relative.is_stationary(self.config.stationary_epsilon) {
            let (aspect, exact) = nearest_mutual(separation);
            if angle::angular_distance(separation, exact) <= orb {
                return Ok(MutualEstimate { aspect, day: 0.0 });
            }
            return Err(ResultKind::Stationary);
        }

        let targets: Vec<f64> = MUTUAL_ASPECTS.iter().map(|(_, a)| *a).collect();
        let event = AspectLocator::new(self.config).locate(&relative, &targets, orb, SearchDirection::Future, epoch);

        let days = match (event.result_kind, event.days_away) {
            (ResultKind::Found, Some(days)) => days,
            (kind, _) => return Err(kind),
        };

        let (aspect, _) = nearest_mutual(relative.position_after(days));
        Ok(MutualEstimate { aspect, day: days.floor() })
    }

    /// First hour (from the estimated day) at which the fast reference is
    /// within `orb` of `position`.
    fn first_reference_hour(
        &self,
        fast_reference: &MotionModel,
        position: f64,
        day: f64,
        orb: f64,
    ) -> Option<(u32, f64)> {
        (0..self.config.compound_hour_steps).find_map(|hour| {
            let at = fast_reference.position_after(day + f64::from(hour) / 24.0);
            let distance = angle::angular_distance(at, position);
            log::trace!("{} hour {hour}: {at:.2} vs {position:.2}", fast_reference.id);
            (distance <= orb).then_some((hour, distance))
        })
    }
}

/// Mutual aspect closest to a given A→B separation.
fn nearest_mutual(separation: f64) -> (&'static str, f64) {
    MUTUAL_ASPECTS
        .iter()
        .copied()
        .min_by(|x, y| {
            angle::angular_distance(separation, x.1).total_cmp(&angle::angular_distance(separation, y.1))
        })
        .unwrap_or(MUTUAL_ASPECTS[0])
}
