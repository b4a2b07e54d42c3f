use std::collections::VecDeque;

use crate::config::{SearchConfig, MAX_DEFAULT_WINDOW_MINUTES};
use crate::events::DurationWindow;
use crate::stacking::types::{ExternalEvent, LinkTarget, StackEntry, StackLink, StackedGroup};

/// Detects alignment events that land on top of each other in time.
pub struct StackDetector {
    default_window_minutes: i64,
}

impl StackDetector {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            default_window_minutes: config.default_window_minutes.clamp(0, MAX_DEFAULT_WINDOW_MINUTES),
        }
    }

    /// Point-in-time proximity against externally produced lists.
    ///
    /// Only external events whose timestamp parses and which are flagged
    /// conjunct are considered. Windows play no part here.
    pub fn stack_cross(
        &self,
        primary: &mut [StackEntry],
        external_lists: &[Vec<ExternalEvent>],
        tolerance_hours: f64,
    ) {
        let tolerance_ms = tolerance_hours * 3_600_000.0;
        let candidates: Vec<_> = external_lists
            .iter()
            .enumerate()
            .flat_map(|(list, events)| {
                events
                    .iter()
                    .enumerate()
                    .map(move |(index, e)| (LinkTarget::External { list, index }, e))
            })
            .filter(|(_, e)| e.is_conjunct)
            .filter_map(|(target, e)| e.parsed_time().map(|t| (target, e, t)))
            .collect();

        for entry in primary.iter_mut() {
            let Some(time) = entry.effective_time() else {
                continue;
            };
            for (target, external, ext_time) in &candidates {
                let delta = *ext_time - time;
                if (delta.num_milliseconds() as f64).abs() > tolerance_ms {
                    continue;
                }
                let added = entry.add_link(StackLink {
                    target: *target,
                    name: external.event_type.clone(),
                    description: external.description.clone(),
                    overlap_minutes: None,
                    offset_minutes: Some(delta.num_minutes()),
                });
                if added {
                    log::debug!("{} stacks with external {}", entry.name, external.event_type);
                }
            }
        }
    }

    /// Window-overlap stacking within one list.
    ///
    /// Entries without an explicit window get `±default_window_minutes`
    /// around their time. Windows must actually intersect; close centres
    /// are not enough.
    pub fn stack_internal(&self, entries: &mut [StackEntry], exclude_same_category: bool) {
        let windows: Vec<_> = entries
            .iter()
            .map(|e| e.effective_window(self.default_window_minutes))
            .collect();
        let categories: Vec<String> = entries.iter().map(StackEntry::category).collect();

        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (Some(wi), Some(wj)) = (windows[i], windows[j]) else {
                    continue;
                };
                if exclude_same_category && categories[i] == categories[j] {
                    continue;
                }
                let Some(overlap) = wi.overlap_minutes(&wj) else {
                    continue;
                };

                let link_to_j = StackLink {
                    target: LinkTarget::Entry { index: j },
                    name: entries[j].name.clone(),
                    description: entries[j].description.clone(),
                    overlap_minutes: Some(overlap),
                    offset_minutes: None,
                };
                let link_to_i = StackLink {
                    target: LinkTarget::Entry { index: i },
                    name: entries[i].name.clone(),
                    description: entries[i].description.clone(),
                    overlap_minutes: Some(overlap),
                    offset_minutes: None,
                };
                entries[i].add_link(link_to_j);
                entries[j].add_link(link_to_i);
                log::trace!("{} overlaps {} by {overlap} min", entries[i].name, entries[j].name);
            }
        }
    }

    /// Connected groups of entries linked by window stacking. Links are
    /// followed by position, so `entries` must be the slice passed to
    /// [`stack_internal`](Self::stack_internal).
    pub fn group_stacks(&self, entries: &[StackEntry]) -> Vec<StackedGroup> {
        let neighbours: Vec<Vec<usize>> = entries
            .iter()
            .map(|e| {
                e.stacked_with
                    .iter()
                    .filter_map(|l| match l.target {
                        LinkTarget::Entry { index } if index < entries.len() => Some(index),
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        let mut seen = vec![false; entries.len()];
        let mut groups = Vec::new();
        for start in 0..entries.len() {
            if seen[start] || neighbours[start].is_empty() {
                continue;
            }
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            seen[start] = true;
            while let Some(i) = queue.pop_front() {
                members.push(i);
                for &n in &neighbours[i] {
                    if !seen[n] {
                        seen[n] = true;
                        queue.push_back(n);
                    }
                }
            }
            if members.len() < 2 {
                continue;
            }
            members.sort_unstable();
            groups.push(self.build_group(entries, members));
        }
        groups
    }

    fn build_group(&self, entries: &[StackEntry], members: Vec<usize>) -> StackedGroup {
        let primary_time = members.iter().filter_map(|&i| entries[i].effective_time()).min();

        let overlap_minutes = members
            .iter()
            .filter_map(|&i| entries[i].effective_window(self.default_window_minutes))
            .map(Some)
            .reduce(|common, w| {
                let (start, end) = common?.intersection(&w?)?;
                Some(DurationWindow::spanning(start, end))
            })
            .flatten()
            .map(|common| common.length().num_minutes());

        StackedGroup {
            primary_time,
            power_score: members.len(),
            members,
            overlap_minutes,
        }
    }
}
