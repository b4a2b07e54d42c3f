use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_DEFAULT_WINDOW_MINUTES;
use crate::events::{AlignmentEvent, DurationWindow};

/// Naive timestamp layouts accepted from external lists, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Which event a link points at. Names repeat (the same aspect found in
/// both directions, two lists reporting one event type), positions do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum LinkTarget {
    /// Index into the list being stacked
    Entry { index: usize },
    /// Event `index` of external list `list`
    External { list: usize, index: usize },
}

/// Cross-reference from one stacked event to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackLink {
    pub target: LinkTarget,
    /// Name (or external type) of the other event
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes shared by both windows (window-based stacking)
    #[serde(default)]
    pub overlap_minutes: Option<i64>,
    /// Signed minutes from this event to the other (proximity stacking)
    #[serde(default)]
    pub offset_minutes: Option<i64>,
}

/// An event taking part in stacking, with its accumulated annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackEntry {
    pub name: String,
    /// Explicit category; derived from the name prefix when absent
    #[serde(default)]
    pub category: Option<String>,
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window: Option<DurationWindow>,
    /// Whether this is a true conjunction
    #[serde(default)]
    pub is_conjunct: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stacked_with: Vec<StackLink>,
    #[serde(default)]
    pub stacked_power: usize,
}

impl StackEntry {
    pub fn new(name: impl Into<String>, time: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            category: None,
            time,
            window: None,
            is_conjunct: false,
            description: None,
            stacked_with: Vec::new(),
            stacked_power: 0,
        }
    }

    pub fn with_window(mut self, window: DurationWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Stacking view of an alignment event. The name starts with the
    /// body id, so events of the same body share a category.
    pub fn from_event(event: &AlignmentEvent) -> Self {
        Self {
            name: format!("{}_{}_{}", event.body, event.kind, event.target),
            category: None,
            time: event.exact_time,
            window: event.duration,
            is_conjunct: event.kind.starts_with("conjunction"),
            description: event.description.clone(),
            stacked_with: Vec::new(),
            stacked_power: 0,
        }
    }

    /// Category used to skip trivial same-kind stacking.
    pub fn category(&self) -> String {
        match &self.category {
            Some(c) => c.to_lowercase(),
            None => name_prefix(&self.name),
        }
    }

    /// Point in time representing this entry.
    pub fn effective_time(&self) -> Option<DateTime<Utc>> {
        self.time.or(self.window.map(|w| w.exact))
    }

    /// Explicit window, or `±default_minutes` around the entry time.
    /// The half-width is capped at [`MAX_DEFAULT_WINDOW_MINUTES`].
    pub fn effective_window(&self, default_minutes: i64) -> Option<DurationWindow> {
        let half = Duration::minutes(default_minutes.clamp(0, MAX_DEFAULT_WINDOW_MINUTES));
        self.window.or_else(|| self.time.map(|t| DurationWindow::around(t, half)))
    }

    /// Record a link once per target; returns whether it was new.
    pub(crate) fn add_link(&mut self, link: StackLink) -> bool {
        let exists = self.stacked_with.iter().any(|l| l.target == link.target);
        if !exists {
            self.stacked_with.push(link);
        }
        self.stacked_power = self.stacked_with.len();
        !exists
    }
}

/// Lower-cased prefix of an event name up to the first `_`, `:` or space.
pub fn name_prefix(name: &str) -> String {
    name.trim()
        .split(|c: char| c == '_' || c == ':' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Event supplied by another producer, with a timestamp that may not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub event_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub timestamp: String,
    /// Only true/conjunct external events take part in stacking
    #[serde(default)]
    pub is_conjunct: bool,
}

impl ExternalEvent {
    pub fn parsed_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// RFC 3339 first, then a few naive layouts taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// A cluster of mutually stacked entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedGroup {
    pub primary_time: Option<DateTime<Utc>>,
    /// Indices into the stacked entry list
    pub members: Vec<usize>,
    /// Minutes shared by every member window, when they all intersect
    pub overlap_minutes: Option<i64>,
    pub power_score: usize,
}
