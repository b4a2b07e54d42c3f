//! Nearest exact-aspect search for one moving point against fixed targets.
//!
//! Motion is linear, so the time to any target is the distance actually
//! travelled in the effective direction of motion divided by the daily rate.
//! No sampling is needed.

use chrono::{DateTime, Utc};

use crate::angle;
use crate::aspects::AspectCatalog;
use crate::config::SearchConfig;
use crate::events::{offset_days, AlignmentEvent, DurationWindow, ResultKind};
use crate::motion::{signed_daily_delta, MotionModel, SearchDirection};

/// Kind given to events located against bare target points.
const GENERIC_KIND: &str = "alignment";

pub struct AspectLocator<'a> {
    config: &'a SearchConfig,
}

impl<'a> AspectLocator<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// Nearest alignment of `model` with any of `target_points`, searching
    /// in `direction` from `epoch` up to the configured horizon.
    pub fn locate(
        &self,
        model: &MotionModel,
        target_points: &[f64],
        orb: f64,
        direction: SearchDirection,
        epoch: DateTime<Utc>,
    ) -> AlignmentEvent {
        let target_label = describe_targets(target_points);

        if model.is_stationary(self.config.stationary_epsilon) {
            log::debug!("{} is stationary, refusing to search", model.id);
            return AlignmentEvent::unresolved(
                ResultKind::Stationary,
                GENERIC_KIND,
                &model.id,
                target_label,
                direction,
            );
        }

        if let Some(event) = self.already_in_orb(model, target_points, orb, direction, epoch) {
            return event.with_description(format!("within orb of {target_label}"));
        }

        let delta = signed_daily_delta(model.daily_rate, model.direction, direction);
        let horizon = self.config.horizon_days(direction);

        let best = target_points
            .iter()
            .map(|&t| {
                let distance = angle::distance_along_motion(model.current, t, delta);
                (t, distance / model.daily_rate)
            })
            .filter(|&(t, days)| {
                let keep = days <= horizon;
                if !keep {
                    log::trace!("{}: target {t:.2} is {days:.1} days away, past horizon", model.id);
                }
                keep
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((target, days)) = best else {
            log::debug!("{}: nothing within {horizon} days ({direction:?})", model.id);
            return AlignmentEvent::unresolved(
                ResultKind::NotFoundWithinHorizon,
                GENERIC_KIND,
                &model.id,
                target_label,
                direction,
            );
        };

        let Some(exact) = offset_days(epoch, days * direction.sign()) else {
            log::debug!("{}: exact {days:.0} days out is not a representable time", model.id);
            return AlignmentEvent::unresolved(
                ResultKind::NotFoundWithinHorizon,
                GENERIC_KIND,
                &model.id,
                target_label,
                direction,
            );
        };
        log::debug!("{}: exact at {target:.2} in {days:.2} days ({direction:?})", model.id);

        AlignmentEvent::found(GENERIC_KIND, &model.id, target_label, direction, exact, days)
            .with_duration(DurationWindow::from_orb_and_rate(exact, orb, model.daily_rate))
    }

    /// Immediate hit when some target is already within `orb`; the first
    /// qualifying target in enumeration order wins.
    fn already_in_orb(
        &self,
        model: &MotionModel,
        target_points: &[f64],
        orb: f64,
        direction: SearchDirection,
        epoch: DateTime<Utc>,
    ) -> Option<AlignmentEvent> {
        target_points.iter().find_map(|&t| {
            let direct_sep = angle::forward_distance(model.current, t);
            let retro_sep = angle::backward_distance(model.current, t);
            let separation = direct_sep.min(retro_sep);
            if separation > orb {
                return None;
            }
            let offset = angle::normalize_signed(t - model.current);
            let applying = offset * model.signed_rate() > 0.0;
            Some(
                AlignmentEvent::found(GENERIC_KIND, &model.id, describe_targets(target_points), direction, epoch, 0.0)
                    .with_distance(separation)
                    .with_applying(applying)
                    .with_duration(DurationWindow::from_orb_and_rate(epoch, orb, model.daily_rate)),
            )
        })
    }

    /// One event per catalog aspect between `model` and a fixed reference.
    pub fn locate_aspects(
        &self,
        model: &MotionModel,
        reference: f64,
        reference_label: &str,
        catalog: &AspectCatalog,
        direction: SearchDirection,
        epoch: DateTime<Utc>,
    ) -> Vec<AlignmentEvent> {
        catalog
            .aspects()
            .iter()
            .map(|aspect| {
                let targets = aspect.target_points(reference);
                let mut event = self.locate(model, &targets, aspect.orb, direction, epoch);
                event.kind = aspect.name.clone();
                event.target = reference_label.to_string();
                event
            })
            .collect()
    }

    pub fn next_aspect(
        &self,
        model: &MotionModel,
        reference: f64,
        reference_label: &str,
        catalog: &AspectCatalog,
        epoch: DateTime<Utc>,
    ) -> Option<AlignmentEvent> {
        self.nearest(model, reference, reference_label, catalog, SearchDirection::Future, epoch)
    }

    pub fn prev_aspect(
        &self,
        model: &MotionModel,
        reference: f64,
        reference_label: &str,
        catalog: &AspectCatalog,
        epoch: DateTime<Utc>,
    ) -> Option<AlignmentEvent> {
        self.nearest(model, reference, reference_label, catalog, SearchDirection::Past, epoch)
    }

    /// Closest found aspect of any catalog type.
    fn nearest(
        &self,
        model: &MotionModel,
        reference: f64,
        reference_label: &str,
        catalog: &AspectCatalog,
        direction: SearchDirection,
        epoch: DateTime<Utc>,
    ) -> Option<AlignmentEvent> {
        self.locate_aspects(model, reference, reference_label, catalog, direction, epoch)
            .into_iter()
            .filter(AlignmentEvent::is_found)
            .min_by(|a, b| {
                let da = a.days_away.unwrap_or(f64::INFINITY);
                let db = b.days_away.unwrap_or(f64::INFINITY);
                da.total_cmp(&db)
            })
    }
}

fn describe_targets(target_points: &[f64]) -> String {
    target_points
        .iter()
        .map(|t| format!("{:.2}°", angle::normalize(*t)))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Direction;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_already_in_orb_is_immediate() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("sun", 10.0, 1.0, Direction::Direct);

        let event = locator.locate(&body, &[15.0], 5.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::Found);
        assert_eq!(event.days_away, Some(0.0));
        assert_eq!(event.exact_time, Some(epoch()));
        assert!((event.distance_deg - 5.0).abs() < 1e-9);
        assert!(event.is_applying);
    }

    #[test]
    fn test_outside_orb_travels_to_exact() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("sun", 10.0, 1.0, Direction::Direct);

        let event = locator.locate(&body, &[15.0], 3.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::Found);
        assert!((event.days_away.unwrap() - 5.0).abs() < 1e-9);
        let window = event.duration.unwrap();
        assert_eq!(window.start, epoch() + chrono::Duration::days(2));
    }

    #[test]
    fn test_first_qualifying_target_wins() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("venus", 100.0, 1.2, Direction::Direct);

        let event = locator.locate(&body, &[103.0, 100.5], 4.0, SearchDirection::Future, epoch());
        assert!((event.distance_deg - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_retrograde_goes_the_short_way_back() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("mercury", 20.0, 0.5, Direction::Retrograde);

        let event = locator.locate(&body, &[10.0], 1.0, SearchDirection::Future, epoch());
        assert!((event.days_away.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_past_search_inverts_direction() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("mars", 50.0, 0.5, Direction::Direct);

        let event = locator.locate(&body, &[40.0], 1.0, SearchDirection::Past, epoch());
        assert_eq!(event.result_kind, ResultKind::Found);
        assert!((event.days_away.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(event.exact_time, Some(epoch() - chrono::Duration::days(20)));
        assert!(!event.is_applying);
    }

    #[test]
    fn test_horizon_cuts_off() {
        let config = SearchConfig { future_horizon_days: 100.0, ..Default::default() };
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("saturn", 0.0, 0.03, Direction::Direct);

        let event = locator.locate(&body, &[90.0], 1.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::NotFoundWithinHorizon);
        assert!(event.exact_time.is_none());
    }

    #[test]
    fn test_stationary() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("pluto", 0.0, 0.0, Direction::Direct);
        let event = locator.locate(&body, &[0.5], 1.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::Stationary);
    }

    #[test]
    fn test_locate_aspects_labels_events() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let catalog = AspectCatalog::conjunction_opposition();
        let body = MotionModel::new("jupiter", 30.0, 0.2, Direction::Direct);

        let events = locator.locate_aspects(&body, 60.0, "natal_sun", &catalog, SearchDirection::Future, epoch());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "conjunction");
        assert_eq!(events[1].kind, "opposition");
        assert!(events.iter().all(|e| e.target == "natal_sun"));
        // 30 deg to the conjunction at 0.2 deg/day
        assert!((events[0].days_away.unwrap() - 150.0).abs() < 1e-6);

        let next = locator.next_aspect(&body, 60.0, "natal_sun", &catalog, epoch()).unwrap();
        assert_eq!(next.kind, "conjunction");
    }

    #[test]
    fn test_prev_aspect_looks_backwards() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let catalog = AspectCatalog::conjunction_opposition();
        let body = MotionModel::new("jupiter", 30.0, 0.2, Direction::Direct);

        // 150 deg back to the opposition at 240, 210 back to the conjunction
        let prev = locator.prev_aspect(&body, 60.0, "natal_sun", &catalog, epoch()).unwrap();
        assert_eq!(prev.kind, "opposition");
        assert_eq!(prev.search_direction, SearchDirection::Past);
        assert!((prev.days_away.unwrap() - 750.0).abs() < 1e-6);
        assert!(prev.exact_time.unwrap() < epoch());
    }

    #[test]
    fn test_near_stationary_in_orb_gets_clamped_window() {
        let config = SearchConfig::default();
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("pluto", 10.0, 1e-8, Direction::Direct);

        let event = locator.locate(&body, &[12.0], 6.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::Found);
        assert_eq!(event.days_away, Some(0.0));
        let window = event.duration.unwrap();
        assert_eq!(window.exact - window.start, window.end - window.exact);
    }

    #[test]
    fn test_unrepresentable_exact_time_is_not_found() {
        let config = SearchConfig { future_horizon_days: 1e12, ..Default::default() };
        let locator = AspectLocator::new(&config);
        let body = MotionModel::new("pluto", 10.0, 1e-8, Direction::Direct);

        // 2 deg at 1e-8/day is 2e8 days, far past the calendar
        let event = locator.locate(&body, &[12.0], 1.0, SearchDirection::Future, epoch());
        assert_eq!(event.result_kind, ResultKind::NotFoundWithinHorizon);
        assert!(event.exact_time.is_none());
    }
}
