use chrono::{DateTime, Duration, TimeZone, Utc};
use fortuna::stacking::parse_timestamp;
use fortuna::{
    AlignmentEvent, DurationWindow, ExternalEvent, SearchConfig, SearchDirection, StackDetector, StackEntry,
};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 4, h, m, 0).unwrap()
}

fn event(body: &str, kind: &str, target: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> AlignmentEvent {
    let window = DurationWindow::spanning(from, to);
    AlignmentEvent::found(kind, body, target, SearchDirection::Future, window.exact, 1.0).with_duration(window)
}

#[test]
fn test_event_windows_stack_across_bodies() {
    let detector = StackDetector::new(&SearchConfig::default());
    let events = [
        event("venus", "trine", "natal_sun", at(10, 0), at(10, 30)),
        event("mars", "conjunction", "natal_asc", at(10, 20), at(10, 50)),
        event("venus", "square", "natal_moon", at(10, 25), at(10, 35)),
    ];
    let mut entries: Vec<StackEntry> = events.iter().map(StackEntry::from_event).collect();
    detector.stack_internal(&mut entries, true);

    assert_eq!(entries[0].name, "venus_trine_natal_sun");
    assert!(entries[1].is_conjunct);

    // venus/venus pairs share a category and are skipped
    assert_eq!(entries[0].stacked_power, 1);
    assert_eq!(entries[2].stacked_power, 1);
    assert_eq!(entries[1].stacked_power, 2);
    assert_eq!(entries[0].stacked_with[0].overlap_minutes, Some(10));
    assert_eq!(entries[2].stacked_with[0].overlap_minutes, Some(10));
}

#[test]
fn test_close_centres_without_overlap_do_not_stack() {
    let detector = StackDetector::new(&SearchConfig::default());
    let mut entries = vec![
        StackEntry::new("a", None).with_window(DurationWindow::around(at(8, 0), Duration::minutes(2))),
        StackEntry::new("b", None).with_window(DurationWindow::around(at(8, 5), Duration::minutes(2))),
    ];
    detector.stack_internal(&mut entries, false);
    assert!(entries.iter().all(|e| e.stacked_power == 0));
    assert!(detector.group_stacks(&entries).is_empty());
}

#[test]
fn test_explicit_categories_override_prefix() {
    let detector = StackDetector::new(&SearchConfig::default());
    let mut entries = vec![
        StackEntry::new("a_one", Some(at(9, 0))).with_category("Lunar"),
        StackEntry::new("b_two", Some(at(9, 1))).with_category("lunar"),
        StackEntry::new("c_three", Some(at(9, 2))),
    ];
    detector.stack_internal(&mut entries, true);
    assert_eq!(entries[0].stacked_power, 1);
    assert_eq!(entries[1].stacked_power, 1);
    assert_eq!(entries[2].stacked_power, 2);
}

#[test]
fn test_entries_without_time_are_ignored() {
    let detector = StackDetector::new(&SearchConfig::default());
    let mut entries = vec![StackEntry::new("a", None), StackEntry::new("b", Some(at(9, 0)))];
    let lists = vec![vec![ExternalEvent {
        event_type: "full_moon".into(),
        description: None,
        timestamp: "2025-10-04 09:30".into(),
        is_conjunct: true,
    }]];
    detector.stack_internal(&mut entries, false);
    detector.stack_cross(&mut entries, &lists, 1.0);
    assert!(entries[0].stacked_with.is_empty());
    assert_eq!(entries[1].stacked_with.len(), 1);
    assert_eq!(entries[1].stacked_with[0].offset_minutes, Some(30));
}

#[test]
fn test_cross_stacking_offsets_are_signed() {
    let detector = StackDetector::new(&SearchConfig::default());
    let mut entries = vec![StackEntry::new("sun_trine_mc", Some(at(12, 0)))];
    let lists = vec![vec![ExternalEvent {
        event_type: "eclipse".into(),
        description: Some("partial".into()),
        timestamp: "2025-10-04T11:15:00Z".into(),
        is_conjunct: true,
    }]];
    detector.stack_cross(&mut entries, &lists, 2.0);
    assert_eq!(entries[0].stacked_with[0].offset_minutes, Some(-45));
    // proximity links do not form window groups
    assert!(detector.group_stacks(&entries).is_empty());
}

#[test]
fn test_group_overlap_is_none_when_chain_is_not_common() {
    let detector = StackDetector::new(&SearchConfig::default());
    let mut entries = vec![
        StackEntry::new("a", None).with_window(DurationWindow::spanning(at(9, 0), at(9, 20))),
        StackEntry::new("b", None).with_window(DurationWindow::spanning(at(9, 15), at(9, 40))),
        StackEntry::new("c", None).with_window(DurationWindow::spanning(at(9, 35), at(9, 55))),
    ];
    detector.stack_internal(&mut entries, false);
    let groups = detector.group_stacks(&entries);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![0, 1, 2]);
    assert_eq!(groups[0].overlap_minutes, None);
    assert_eq!(groups[0].primary_time, Some(at(9, 10)));
}

#[test]
fn test_parse_timestamp_reexported() {
    assert_eq!(parse_timestamp("2025-10-04 12:00:00"), Some(at(12, 0)));
}
