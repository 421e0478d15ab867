use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyze::evaluator::EvaluatedHeader;

/// Letter summary of a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized 0-100 score: `round(100 * earned / possible)`.
pub fn score(evaluated: &[EvaluatedHeader]) -> u8 {
    let earned: f64 = evaluated.iter().map(|e| e.score).sum();
    let possible: f64 = evaluated.iter().map(|e| e.max_score).sum();
    if possible <= 0.0 {
        return 0;
    }
    (100.0 * earned / possible).round().clamp(0.0, 100.0) as u8
}

/// Inclusive lower bounds: 95 A+, 85 A, 75 B, 65 C, 50 D.
pub fn grade(score: u8) -> Grade {
    match score {
        95..=u8::MAX => Grade::APlus,
        85..=94 => Grade::A,
        75..=84 => Grade::B,
        65..=74 => Grade::C,
        50..=64 => Grade::D,
        _ => Grade::F,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::rules::Severity;

    fn evaluated(score: f64, max_score: f64) -> EvaluatedHeader {
        EvaluatedHeader {
            name: "X-Test".into(),
            present: true,
            value: None,
            score,
            max_score,
            required: true,
            severity: Severity::Low,
            recommendation: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        assert_eq!(grade(100), Grade::APlus);
        assert_eq!(grade(95), Grade::APlus);
        assert_eq!(grade(94), Grade::A);
        assert_eq!(grade(85), Grade::A);
        assert_eq!(grade(84), Grade::B);
        assert_eq!(grade(75), Grade::B);
        assert_eq!(grade(74), Grade::C);
        assert_eq!(grade(65), Grade::C);
        assert_eq!(grade(64), Grade::D);
        assert_eq!(grade(50), Grade::D);
        assert_eq!(grade(49), Grade::F);
        assert_eq!(grade(0), Grade::F);
    }

    #[test]
    fn score_rounds_to_nearest() {
        let parts = vec![evaluated(12.5, 25.0), evaluated(20.0, 20.0), evaluated(0.9, 3.0)];
        // 33.4 / 48 = 69.58
        assert_eq!(score(&parts), 70);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(score(&[]), 0);
    }

    #[test]
    fn grade_serializes_with_plus_sign() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(Grade::APlus.to_string(), "A+");
    }
}
