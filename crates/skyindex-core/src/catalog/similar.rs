//! Attribute similarity between catalog records

use super::coords::angular_separation;
use super::record::CelestialObjectRecord;

const TYPE_WEIGHT: f64 = 0.4;
const POSITION_WEIGHT: f64 = 0.3;
const BRIGHTNESS_WEIGHT: f64 = 0.3;

/// Separation (degrees) at which position closeness reaches zero
const POSITION_SCALE_DEG: f64 = 10.0;
/// Magnitude difference at which brightness closeness reaches zero
const MAGNITUDE_SCALE: f64 = 5.0;

/// Scores at or below this are not reported
pub const SIMILARITY_THRESHOLD: f64 = 0.1;

/// Weighted similarity of two records in [0, 1].
///
/// Same non-blank type contributes 0.4, sky closeness `1 - min(1, sep/10°)`
/// contributes up to 0.3, and brightness closeness `1 - min(1, |Δmag|/5)` up
/// to 0.3.
pub fn attribute_similarity(a: &CelestialObjectRecord, b: &CelestialObjectRecord) -> f64 {
    let mut score = 0.0;

    if !a.object_type.is_empty() && a.object_type == b.object_type {
        score += TYPE_WEIGHT;
    }

    let separation = angular_separation(a.ra_deg, a.dec_deg, b.ra_deg, b.dec_deg);
    score += POSITION_WEIGHT * (1.0 - (separation / POSITION_SCALE_DEG).min(1.0));

    let magnitude_delta = (a.visual_magnitude - b.visual_magnitude).abs();
    score += BRIGHTNESS_WEIGHT * (1.0 - (magnitude_delta / MAGNITUDE_SCALE).min(1.0));

    score
}
