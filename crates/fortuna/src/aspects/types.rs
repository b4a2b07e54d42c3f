use serde::{Deserialize, Serialize};

use crate::angle;

/// A named angular offset and the orb within which it counts as active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectDefinition {
    /// Aspect type: "conjunction", "trine", etc.
    pub name: String,
    /// Exact angle for this aspect, in [0, 180]
    pub angle: f64,
    /// Tolerance in degrees
    pub orb: f64,
}

impl AspectDefinition {
    pub fn new(name: impl Into<String>, angle: f64, orb: f64) -> Self {
        Self {
            name: name.into(),
            angle: angle.clamp(0.0, 180.0),
            orb: orb.max(0.0),
        }
    }

    /// Absolute positions at which a mover forms this aspect to `reference`.
    ///
    /// Conjunction and opposition have a single point; every other aspect
    /// has one on each side of the reference.
    pub fn target_points(&self, reference: f64) -> Vec<f64> {
        let ahead = angle::normalize(reference + self.angle);
        let behind = angle::normalize(reference - self.angle);
        if angle::angular_distance(ahead, behind) < 1e-9 {
            vec![ahead]
        } else {
            vec![ahead, behind]
        }
    }
}

/// Ordered set of aspects to search for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectCatalog {
    aspects: Vec<AspectDefinition>,
}

impl AspectCatalog {
    pub fn new(aspects: Vec<AspectDefinition>) -> Self {
        Self { aspects }
    }

    /// The two aspects used by the compound and lucky-time searches.
    pub fn conjunction_opposition() -> Self {
        Self::new(vec![
            AspectDefinition::new("conjunction", 0.0, 8.0),
            AspectDefinition::new("opposition", 180.0, 8.0),
        ])
    }

    pub fn aspects(&self) -> &[AspectDefinition] {
        &self.aspects
    }

    pub fn get(&self, name: &str) -> Option<&AspectDefinition> {
        self.aspects.iter().find(|a| a.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    /// Override the orb of one aspect. Returns false if it is not in the catalog.
    pub fn set_orb(&mut self, name: &str, orb: f64) -> bool {
        match self.aspects.iter_mut().find(|a| a.name == name) {
            Some(aspect) => {
                aspect.orb = orb.max(0.0);
                true
            }
            None => false,
        }
    }

    pub fn max_orb(&self) -> f64 {
        self.aspects.iter().map(|a| a.orb).fold(0.0, f64::max)
    }
}

impl Default for AspectCatalog {
    fn default() -> Self {
        Self::new(vec![
            AspectDefinition::new("conjunction", 0.0, 8.0),
            AspectDefinition::new("sextile", 60.0, 4.0),
            AspectDefinition::new("square", 90.0, 6.0),
            AspectDefinition::new("trine", 120.0, 7.0),
            AspectDefinition::new("quincunx", 150.0, 3.0),
            AspectDefinition::new("opposition", 180.0, 8.0),
        ])
    }
}

/// Core aspect information between two positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectMatch {
    pub aspect_type: String,
    pub exact_angle: f64,
    /// Deviation from the exact angle
    pub orb: f64,
    /// Whether the aspect is applying (approaching exact)
    pub is_applying: bool,
    /// Whether the aspect is exact (within 0.1 degrees)
    pub is_exact: bool,
    /// Whether either point is retrograde
    pub is_retrograde: bool,
}
