//! Lucky-time forecast: runs every search over a chart snapshot and stacks
//! the results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::angle;
use crate::aspects::{AspectCalculator, AspectCatalog};
use crate::chart::LayerPositions;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::events::{AlignmentEvent, ResultKind};
use crate::motion::{MotionModel, SearchDirection};
use crate::search::{
    find_crossing_time, linear_position, AspectLocator, CompoundSearch, ProjectionEstimator,
    TargetBand, TimeResult, TwoPassParams,
};
use crate::stacking::{ExternalEvent, StackDetector, StackEntry, StackedGroup};

const MISSING_KIND: &str = "missing_data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRequest {
    pub body_a: String,
    pub body_b: String,
    /// Planet or chart angle used as the fast reference
    pub fast_reference: String,
    pub orb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub body: String,
    pub low: f64,
    pub high: f64,
}

/// Find the time of day a transiting angle crosses a natal point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingRequest {
    pub date: NaiveDate,
    /// Transit chart angle, e.g. "asc"
    pub angle: String,
    /// Natal point id
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub epoch: DateTime<Utc>,
    pub natal: LayerPositions,
    pub transit: LayerPositions,
    pub transit_bodies: Vec<String>,
    pub natal_points: Vec<String>,
    #[serde(default)]
    pub compound: Option<CompoundRequest>,
    #[serde(default)]
    pub projections: Vec<ProjectionRequest>,
    #[serde(default)]
    pub crossings: Vec<CrossingRequest>,
    #[serde(default)]
    pub external_events: Vec<Vec<ExternalEvent>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingOutcome {
    pub angle: String,
    pub target: String,
    pub date: NaiveDate,
    pub result: Option<TimeResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastReport {
    pub events: Vec<AlignmentEvent>,
    pub crossings: Vec<CrossingOutcome>,
    /// Found, non-estimated events with their stacking annotations
    pub stacked: Vec<StackEntry>,
    pub groups: Vec<StackedGroup>,
}

impl ForecastReport {
    pub fn found(&self) -> impl Iterator<Item = &AlignmentEvent> {
        self.events.iter().filter(|e| e.is_found())
    }

    pub fn missing(&self) -> impl Iterator<Item = &AlignmentEvent> {
        self.events
            .iter()
            .filter(|e| e.result_kind == ResultKind::UpstreamDataMissing)
    }
}

pub struct ForecastEngine {
    config: SearchConfig,
    catalog: AspectCatalog,
}

impl ForecastEngine {
    pub fn new(config: SearchConfig, catalog: AspectCatalog) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn run(&self, request: &ForecastRequest) -> ForecastReport {
        let mut report = ForecastReport::default();

        let references = self.references(request, &mut report.events);
        self.locate_transits(request, &references, &mut report.events);

        if let Some(compound) = &request.compound {
            report.events.extend(self.compound(request, compound));
        }

        let estimator = ProjectionEstimator::new(&self.config);
        for projection in &request.projections {
            match request.transit.motion(&projection.body) {
                Ok(model) => report.events.push(estimator.estimate_crossing(
                    &model,
                    TargetBand::new(projection.low, projection.high),
                    request.epoch,
                )),
                Err(err) => report.events.push(missing_event(err)),
            }
        }

        report.crossings = request
            .crossings
            .iter()
            .map(|c| self.crossing(request, c))
            .collect();

        let detector = StackDetector::new(&self.config);
        let mut stacked: Vec<StackEntry> = report
            .events
            .iter()
            .filter(|e| e.is_found() && !e.is_estimated)
            .map(StackEntry::from_event)
            .collect();
        detector.stack_internal(&mut stacked, true);
        detector.stack_cross(&mut stacked, &request.external_events, self.config.stack_tolerance_hours);
        report.groups = detector.group_stacks(&stacked);
        report.stacked = stacked;

        log::info!(
            "forecast: {} events ({} found), {} stacked groups",
            report.events.len(),
            report.found().count(),
            report.groups.len()
        );
        report
    }

    /// Natal reference points plus their shadow points.
    fn references(&self, request: &ForecastRequest, events: &mut Vec<AlignmentEvent>) -> Vec<(String, f64)> {
        let mut references = Vec::new();
        for id in &request.natal_points {
            match request.natal.reference(id) {
                Ok(lon) => {
                    references.push((id.clone(), lon));
                    if self.config.include_shadow_points {
                        references.push((
                            format!("{id}_shadow"),
                            angle::normalize(lon + self.config.shadow_offset_deg),
                        ));
                    }
                }
                Err(err) => events.push(missing_event(err)),
            }
        }
        references
    }

    fn locate_transits(&self, request: &ForecastRequest, references: &[(String, f64)], events: &mut Vec<AlignmentEvent>) {
        let locator = AspectLocator::new(&self.config);
        let calculator = AspectCalculator::new(&self.catalog);
        let mut directions = vec![SearchDirection::Future];
        if self.config.include_past {
            directions.push(SearchDirection::Past);
        }

        for body in &request.transit_bodies {
            let model = match request.transit.motion(body) {
                Ok(model) => model,
                Err(err) => {
                    events.push(missing_event(err));
                    continue;
                }
            };
            for (label, lon) in references {
                for &direction in &directions {
                    let mut located =
                        locator.locate_aspects(&model, *lon, label, &self.catalog, direction, request.epoch);
                    for event in located.iter_mut().filter(|e| e.is_found() && e.days_away == Some(0.0)) {
                        annotate_in_orb(&calculator, event, &model, *lon);
                    }
                    events.extend(located);
                }
            }
        }
    }

    fn compound(&self, request: &ForecastRequest, compound: &CompoundRequest) -> Vec<AlignmentEvent> {
        let lookup = || -> Result<(MotionModel, MotionModel, MotionModel), SearchError> {
            let a = request.transit.motion(&compound.body_a)?;
            let b = request.transit.motion(&compound.body_b)?;
            let fast = self.fast_reference(&request.transit, &compound.fast_reference)?;
            Ok((a, b, fast))
        };
        match lookup() {
            Ok((a, b, fast)) => {
                CompoundSearch::new(&self.config).find_compound(&a, &b, &fast, compound.orb, request.epoch)
            }
            Err(err) => vec![missing_event(err)],
        }
    }

    fn fast_reference(&self, layer: &LayerPositions, id: &str) -> Result<MotionModel, SearchError> {
        if layer.planets.contains_key(id) {
            layer.motion(id)
        } else {
            layer.cycling_angle(id, self.config.fast_reference_daily_rate)
        }
    }

    fn crossing(&self, request: &ForecastRequest, crossing: &CrossingRequest) -> CrossingOutcome {
        let outcome = |result: Result<TimeResult, SearchError>| {
            let (result, error) = match result {
                Ok(r) => (Some(r), None),
                Err(e) => (None, Some(e.to_string())),
            };
            CrossingOutcome {
                angle: crossing.angle.clone(),
                target: crossing.target.clone(),
                date: crossing.date,
                result,
                error,
            }
        };

        let inputs = request
            .transit
            .cycling_angle(&crossing.angle, self.config.fast_reference_daily_rate)
            .and_then(|model| Ok((model, request.natal.reference(&crossing.target)?)));
        let (model, target) = match inputs {
            Ok(inputs) => inputs,
            Err(err) => return outcome(Err(err)),
        };

        let params = TwoPassParams::from_config(&self.config);
        outcome(find_crossing_time(
            crossing.date,
            target,
            &params,
            linear_position(&model, request.epoch),
        ))
    }
}

/// Label an already-in-orb hit with its current phase. Skipped when a
/// tighter catalog aspect than the event's own is in effect.
fn annotate_in_orb(calculator: &AspectCalculator, event: &mut AlignmentEvent, model: &MotionModel, reference: f64) {
    let Some(current) = calculator.calculate_aspect(model.current, reference, model.signed_rate(), 0.0) else {
        return;
    };
    if current.aspect_type != event.kind {
        return;
    }
    event.is_applying = current.is_applying;
    let phase = match (current.is_exact, current.is_applying) {
        (true, _) => "exact",
        (false, true) => "applying",
        (false, false) => "separating",
    };
    event.description = Some(format!(
        "{} {} {} {phase} (orb {:.2}°)",
        event.body, event.kind, event.target, current.orb
    ));
}

fn missing_event(err: SearchError) -> AlignmentEvent {
    let (layer, object) = match &err {
        SearchError::UpstreamDataMissing { layer, object } => (layer.clone(), object.clone()),
        _ => (String::new(), String::new()),
    };
    AlignmentEvent::unresolved(
        ResultKind::UpstreamDataMissing,
        MISSING_KIND,
        object,
        layer,
        SearchDirection::Future,
    )
    .with_description(err.to_string())
}
