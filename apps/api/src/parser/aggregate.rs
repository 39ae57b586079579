use std::collections::BTreeMap;

use crate::parser::models::Field;

/// Applied to a field's score before weighting when it is under the field's minimum.
pub const BELOW_MINIMUM_FACTOR: f64 = 0.5;
/// Applied to the overall score once per required field under its minimum.
pub const MISSING_REQUIRED_FACTOR: f64 = 0.7;

/// Overall confidence from per-field scores, rounded to two decimals.
///
/// 1. scores under their field minimum are halved
/// 2. weighted average over the fields present
/// 3. ×0.7 for each required field whose unpenalized score is under its minimum
///    (a required field absent from the map counts as 0.0)
pub fn aggregate(field_scores: &BTreeMap<Field, f64>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (field, &score) in field_scores {
        let score = if score.is_finite() { score } else { 0.0 };
        let penalized = if score < field.min_confidence() {
            score * BELOW_MINIMUM_FACTOR
        } else {
            score
        };
        weighted_sum += penalized * field.weight();
        total_weight += field.weight();
    }

    if total_weight <= 0.0 {
        return 0.0;
    }

    let mut overall = weighted_sum / total_weight;

    for field in Field::ALL.iter().filter(|f| f.is_required()) {
        let original = field_scores
            .get(field)
            .copied()
            .filter(|s| s.is_finite())
            .unwrap_or(0.0);
        if original < field.min_confidence() {
            overall *= MISSING_REQUIRED_FACTOR;
        }
    }

    round2(overall.clamp(0.0, 1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
