//! Behavioural properties of the aspect locator over a grid of inputs.

use chrono::{DateTime, TimeZone, Utc};
use fortuna::angle::angular_distance;
use fortuna::{AspectLocator, Direction, MotionModel, ResultKind, SearchConfig, SearchDirection};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap()
}

fn bodies() -> Vec<MotionModel> {
    let mut out = Vec::new();
    for (i, start) in [0.0, 47.5, 179.0, 301.25, 359.9].iter().enumerate() {
        for rate in [0.01, 0.2, 1.0, 13.2] {
            for direction in [Direction::Direct, Direction::Retrograde] {
                out.push(MotionModel::new(format!("b{i}"), *start, rate, direction));
            }
        }
    }
    out
}

const TARGETS: &[f64] = &[0.0, 15.0, 100.0, 180.0, 270.5, 359.0];

#[test]
fn test_found_future_events_project_onto_target() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);
    let orb = 1.0;

    for body in bodies() {
        for &target in TARGETS {
            let event = locator.locate(&body, &[target], orb, SearchDirection::Future, epoch());
            if event.result_kind != ResultKind::Found {
                continue;
            }
            let days = event.days_away.unwrap();
            let landed = body.position_after(days);
            assert!(
                angular_distance(landed, target) <= orb + 1e-9,
                "{} from {:.2} ({:?}) landed at {landed:.4}, target {target}",
                body.id,
                body.current,
                body.direction
            );
        }
    }
}

#[test]
fn test_found_events_respect_horizon() {
    let config = SearchConfig { future_horizon_days: 365.0, past_horizon_days: 200.0, ..Default::default() };
    let locator = AspectLocator::new(&config);

    for body in bodies() {
        for &target in TARGETS {
            for direction in [SearchDirection::Future, SearchDirection::Past] {
                let event = locator.locate(&body, &[target], 0.5, direction, epoch());
                if event.result_kind == ResultKind::Found {
                    let limit = config.horizon_days(direction);
                    assert!(event.days_away.unwrap() <= limit, "{:?}", event);
                } else {
                    assert_eq!(event.result_kind, ResultKind::NotFoundWithinHorizon);
                    assert!(event.exact_time.is_none());
                }
            }
        }
    }
}

#[test]
fn test_windows_are_symmetric() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);

    for body in bodies() {
        let event = locator.locate(&body, &[123.4], 2.0, SearchDirection::Future, epoch());
        if let Some(w) = event.duration {
            let before = (w.exact - w.start).num_milliseconds();
            let after = (w.end - w.exact).num_milliseconds();
            assert_eq!(before, after);
        }
    }
}

#[test]
fn test_in_orb_is_always_immediate() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);

    for body in bodies() {
        let target = body.current + 0.75;
        for direction in [SearchDirection::Future, SearchDirection::Past] {
            let event = locator.locate(&body, &[target], 1.0, direction, epoch());
            assert_eq!(event.result_kind, ResultKind::Found);
            assert_eq!(event.days_away, Some(0.0));
            assert_eq!(event.exact_time, Some(epoch()));
        }
    }
}

#[test]
fn test_zero_rate_is_stationary_for_any_target() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);
    let body = MotionModel::new("node", 42.0, 0.0, Direction::Retrograde);

    for &target in TARGETS {
        for direction in [SearchDirection::Future, SearchDirection::Past] {
            let event = locator.locate(&body, &[target], 3.0, direction, epoch());
            assert_eq!(event.result_kind, ResultKind::Stationary);
        }
    }
}

#[test]
fn test_hundred_degrees_at_one_per_day() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);
    let body = MotionModel::new("sun", 0.0, 1.0, Direction::Direct);

    let event = locator.locate(&body, &[100.0], 1.0, SearchDirection::Future, epoch());
    let days = event.days_away.unwrap();
    assert!((99.0..=100.0).contains(&days), "days = {days}");
}

#[test]
fn test_past_and_future_mirror() {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);
    let direct = MotionModel::new("venus", 200.0, 1.1, Direction::Direct);
    let retro = MotionModel::new("venus", 200.0, 1.1, Direction::Retrograde);

    let past_direct = locator.locate(&direct, &[150.0], 0.5, SearchDirection::Past, epoch());
    let future_retro = locator.locate(&retro, &[150.0], 0.5, SearchDirection::Future, epoch());
    assert_eq!(past_direct.days_away, future_retro.days_away);
    assert!(past_direct.exact_time.unwrap() < epoch());
    assert!(future_retro.exact_time.unwrap() > epoch());
}
