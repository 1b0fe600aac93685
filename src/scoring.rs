//! Weighted scoring and grading of check results

use crate::config::GradeScale;
use crate::types::{CheckMeta, CheckResult, Grade};
use std::collections::HashMap;

/// Combine per-check scores into one overall score in `0..=100`
///
/// Only the checks listed in `metas` contribute to the total weight, so a
/// subset of checks is scored on the same scale as the full registry.
/// Results without a matching meta carry no weight. An empty or
/// zero-weight selection scores 0.
pub fn calculate_overall_score(results: &[CheckResult], metas: &[CheckMeta]) -> u8 {
    let weights: HashMap<&str, u32> = metas.iter().map(|m| (m.id, m.weight)).collect();
    let total_weight: f64 = weights.values().map(|&w| f64::from(w)).sum();

    if total_weight <= 0.0 {
        return 0;
    }

    let weighted_sum: f64 = results
        .iter()
        .map(|r| {
            let weight = weights.get(r.id.as_str()).copied().unwrap_or(0);
            f64::from(r.score) / 100.0 * f64::from(weight)
        })
        .sum();

    let overall = (weighted_sum / total_weight * 100.0).round();
    overall.clamp(0.0, 100.0) as u8
}

/// Resolve the grade band for `score` using the default scale
pub fn get_grade(score: u8) -> Grade {
    GradeScale::default().grade_for(score).clone()
}

impl GradeScale {
    /// First band whose minimum is at or below `score`
    ///
    /// Falls back to the lowest band, so every score resolves.
    pub fn grade_for(&self, score: u8) -> &Grade {
        let bands = self.bands();
        bands
            .iter()
            .find(|g| score >= g.min)
            .or_else(|| bands.last())
            .unwrap_or(&FALLBACK_GRADE)
    }
}

static FALLBACK_GRADE: Grade = Grade {
    min: 0,
    label: String::new(),
    color: String::new(),
};

/// Arithmetic mean of scores rounded to the nearest integer (0 when empty)
pub fn average_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    (f64::from(sum) / scores.len() as f64).round().clamp(0.0, 100.0) as u8
}
