use crate::angle;
use crate::aspects::types::{AspectCatalog, AspectMatch};

/// Separation within which an aspect is reported as exact.
const EXACT_THRESHOLD: f64 = 0.1;

/// Relative speeds below this cannot tell applying from separating.
const MIN_RELATIVE_SPEED: f64 = 0.01;

/// Classifies the aspect currently formed by two moving points.
pub struct AspectCalculator<'a> {
    catalog: &'a AspectCatalog,
}

impl<'a> AspectCalculator<'a> {
    pub fn new(catalog: &'a AspectCatalog) -> Self {
        Self { catalog }
    }

    /// Tightest catalog aspect between two longitudes, using signed speeds
    /// (degrees per day, negative = retrograde) to decide applying/separating.
    pub fn calculate_aspect(
        &self,
        lon1: f64,
        lon2: f64,
        speed1: f64,
        speed2: f64,
    ) -> Option<AspectMatch> {
        let separation = angle::angular_distance(lon1, lon2);

        let best = self
            .catalog
            .aspects()
            .iter()
            .map(|a| (a, (separation - a.angle).abs()))
            .filter(|(a, deviation)| *deviation <= a.orb)
            .min_by(|x, y| x.1.total_cmp(&y.1))?;

        let (aspect, deviation) = best;
        Some(AspectMatch {
            aspect_type: aspect.name.clone(),
            exact_angle: aspect.angle,
            orb: deviation,
            is_applying: is_aspect_applying(lon1, lon2, speed1, speed2, aspect.angle),
            is_exact: deviation < EXACT_THRESHOLD,
            is_retrograde: speed1 < 0.0 || speed2 < 0.0,
        })
    }
}

/// Whether the separation between two points is moving toward `aspect_angle`.
pub fn is_aspect_applying(lon1: f64, lon2: f64, speed1: f64, speed2: f64, aspect_angle: f64) -> bool {
    let relative_speed = speed1 - speed2;
    let current_distance = (angle::angular_distance(lon1, lon2) - aspect_angle).abs();

    if relative_speed.abs() < MIN_RELATIVE_SPEED {
        return current_distance < 0.5;
    }

    // Project a short step forward and see whether we got closer to exact
    let step_days = 0.1;
    let future_separation = angle::angular_distance(
        lon1 + speed1 * step_days,
        lon2 + speed2 * step_days,
    );
    (future_separation - aspect_angle).abs() < current_distance
}
