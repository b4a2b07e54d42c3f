//! Alignment event records produced by every search.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::motion::SearchDirection;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Largest day count converted to a duration. Beyond this no timestamp on
/// either side of the epoch is representable anyway.
pub const MAX_SPAN_DAYS: f64 = 100_000_000.0;

/// Convert fractional days to a chrono duration (millisecond resolution).
///
/// `None` for non-finite values or spans longer than [`MAX_SPAN_DAYS`].
pub fn days_to_duration(days: f64) -> Option<Duration> {
    if !days.is_finite() || days.abs() > MAX_SPAN_DAYS {
        return None;
    }
    Some(Duration::milliseconds((days * MS_PER_DAY).round() as i64))
}

/// `epoch` shifted by `days` (negative = earlier), if the result is a
/// representable timestamp.
pub fn offset_days(epoch: DateTime<Utc>, days: f64) -> Option<DateTime<Utc>> {
    epoch.checked_add_signed(days_to_duration(days)?)
}

/// Terminal state of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Found,
    /// The body does not move fast enough to search with.
    Stationary,
    /// No alignment exists inside the configured horizon.
    NotFoundWithinHorizon,
    /// A required body or point was absent from the supplied chart data.
    UpstreamDataMissing,
}

/// Active period of an alignment, symmetric around the exact time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationWindow {
    pub start: DateTime<Utc>,
    pub exact: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DurationWindow {
    /// Symmetric window of `half_width` on each side of `exact`. The half
    /// width is shrunk when a full one would leave chrono's timestamp range.
    pub fn around(exact: DateTime<Utc>, half_width: Duration) -> Self {
        let half = if half_width < Duration::zero() { -half_width } else { half_width };
        let half = half
            .min(exact - DateTime::<Utc>::MIN_UTC)
            .min(DateTime::<Utc>::MAX_UTC - exact);
        Self {
            start: exact - half,
            exact,
            end: exact + half,
        }
    }

    /// Window for a slow body: it stays within `orb` for `orb / rate` days
    /// on either side of exact.
    pub fn from_orb_and_rate(exact: DateTime<Utc>, orb: f64, daily_rate: f64) -> Self {
        let half = days_to_duration(orb / daily_rate).unwrap_or_else(|| Duration::days(MAX_SPAN_DAYS as i64));
        Self::around(exact, half)
    }

    /// Window for a fast cyclical reference that spends a fixed number of
    /// minutes on each degree.
    pub fn from_orb_minutes(exact: DateTime<Utc>, orb: f64, minutes_per_degree: f64) -> Self {
        let half = days_to_duration(orb * minutes_per_degree / 1440.0)
            .unwrap_or_else(|| Duration::days(MAX_SPAN_DAYS as i64));
        Self::around(exact, half)
    }

    /// Window spanning an explicit range; `exact` is placed at its midpoint.
    pub fn spanning(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let half = (end - start) / 2;
        Self {
            start,
            exact: start + half,
            end: start + half + half,
        }
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &DurationWindow) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Minutes shared with `other`, or `None` when the windows are disjoint.
    pub fn overlap_minutes(&self, other: &DurationWindow) -> Option<i64> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Some((end - start).num_minutes())
    }

    /// Shared interval with `other`, if any.
    pub fn intersection(&self, other: &DurationWindow) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.overlaps(other)
            .then(|| (self.start.max(other.start), self.end.min(other.end)))
    }
}

/// One located (or not located) alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentEvent {
    /// Aspect or configuration name, e.g. "trine" or "conjunction+reference_on_jupiter"
    pub kind: String,
    /// Moving body id
    pub body: String,
    /// Reference point label
    pub target: String,
    pub exact_time: Option<DateTime<Utc>>,
    /// Days from the search epoch (always >= 0, in the search direction)
    pub days_away: Option<f64>,
    /// Separation from exact at the reported moment
    pub distance_deg: f64,
    pub is_applying: bool,
    pub search_direction: SearchDirection,
    pub duration: Option<DurationWindow>,
    pub result_kind: ResultKind,
    /// Set by estimators that skip time refinement
    #[serde(default)]
    pub is_estimated: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl AlignmentEvent {
    pub fn found(
        kind: impl Into<String>,
        body: impl Into<String>,
        target: impl Into<String>,
        search_direction: SearchDirection,
        exact_time: DateTime<Utc>,
        days_away: f64,
    ) -> Self {
        Self {
            kind: kind.into(),
            body: body.into(),
            target: target.into(),
            exact_time: Some(exact_time),
            days_away: Some(days_away),
            distance_deg: 0.0,
            is_applying: search_direction == SearchDirection::Future,
            search_direction,
            duration: None,
            result_kind: ResultKind::Found,
            is_estimated: false,
            description: None,
        }
    }

    /// Sentinel event for a search that ended without a time.
    pub fn unresolved(
        result_kind: ResultKind,
        kind: impl Into<String>,
        body: impl Into<String>,
        target: impl Into<String>,
        search_direction: SearchDirection,
    ) -> Self {
        Self {
            kind: kind.into(),
            body: body.into(),
            target: target.into(),
            exact_time: None,
            days_away: None,
            distance_deg: 0.0,
            is_applying: false,
            search_direction,
            duration: None,
            result_kind,
            is_estimated: false,
            description: None,
        }
    }

    pub fn with_distance(mut self, distance_deg: f64) -> Self {
        self.distance_deg = distance_deg;
        self
    }

    pub fn with_applying(mut self, is_applying: bool) -> Self {
        self.is_applying = is_applying;
        self
    }

    pub fn with_duration(mut self, duration: DurationWindow) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn estimated(mut self) -> Self {
        self.is_estimated = true;
        self
    }

    pub fn is_found(&self) -> bool {
        self.result_kind == ResultKind::Found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_window_symmetry() {
        let exact = at(12, 0);
        let w = DurationWindow::from_orb_and_rate(exact, 3.0, 0.7);
        assert_eq!(w.exact - w.start, w.end - w.exact);

        let w = DurationWindow::from_orb_minutes(exact, 2.5, 4.0);
        assert_eq!(w.exact - w.start, Duration::minutes(10));
        assert_eq!(w.end - w.exact, Duration::minutes(10));
    }

    #[test]
    fn test_spanning_is_symmetric() {
        let w = DurationWindow::spanning(at(10, 0), at(10, 31));
        assert_eq!(w.exact - w.start, w.end - w.exact);
        assert_eq!(w.start, at(10, 0));
    }

    #[test]
    fn test_overlap_minutes() {
        let a = DurationWindow::spanning(at(10, 0), at(10, 30));
        let b = DurationWindow::spanning(at(10, 20), at(10, 50));
        assert_eq!(a.overlap_minutes(&b), Some(10));
        assert_eq!(b.overlap_minutes(&a), Some(10));

        let c = DurationWindow::spanning(at(10, 0), at(10, 10));
        let d = DurationWindow::spanning(at(10, 30), at(10, 40));
        assert_eq!(c.overlap_minutes(&d), None);
    }

    #[test]
    fn test_days_to_duration() {
        assert_eq!(days_to_duration(1.5), Some(Duration::hours(36)));
        assert_eq!(days_to_duration(-0.5), Some(Duration::hours(-12)));
        assert_eq!(days_to_duration(f64::INFINITY), None);
        assert_eq!(days_to_duration(6.0 / 1e-8), None);
    }

    #[test]
    fn test_offset_days_out_of_range() {
        let epoch = at(0, 0);
        assert_eq!(offset_days(epoch, 2.0), Some(epoch + Duration::days(2)));
        // ~270k years: inside the duration cap, outside chrono's calendar
        assert_eq!(offset_days(epoch, 99_000_000.0), None);
        assert_eq!(offset_days(epoch, -99_000_000.0), None);
    }

    #[test]
    fn test_huge_window_is_clamped_symmetrically() {
        let exact = at(12, 0);
        let w = DurationWindow::from_orb_and_rate(exact, 6.0, 1e-8);
        assert_eq!(w.exact, exact);
        assert_eq!(w.exact - w.start, w.end - w.exact);
        assert!(w.start >= DateTime::<Utc>::MIN_UTC);
        assert!(w.end <= DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_intersection() {
        let a = DurationWindow::spanning(at(10, 0), at(10, 30));
        let b = DurationWindow::spanning(at(10, 20), at(10, 50));
        assert_eq!(a.intersection(&b), Some((at(10, 20), at(10, 30))));
        let c = DurationWindow::spanning(at(11, 0), at(11, 10));
        assert_eq!(a.intersection(&c), None);
    }
}
