use serde::{Deserialize, Serialize};

use super::evaluator::EvaluatedHeader;
use super::rules::Severity;

/// Every evaluated header lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedHeaders {
    pub found: Vec<EvaluatedHeader>,
    pub missing: Vec<EvaluatedHeader>,
    pub misconfigured: Vec<EvaluatedHeader>,
}

impl CategorizedHeaders {
    pub fn len(&self) -> usize {
        self.found.len() + self.missing.len() + self.misconfigured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Headers that need a fix, missing first, in rule order within each bucket.
    pub fn actionable(&self) -> impl Iterator<Item = &EvaluatedHeader> {
        self.missing.iter().chain(self.misconfigured.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub header: String,
    pub severity: Severity,
    pub priority: u8,
    pub message: String,
    pub description: String,
}

pub fn categorize(evaluated: &[EvaluatedHeader]) -> CategorizedHeaders {
    let mut out = CategorizedHeaders::default();
    for e in evaluated {
        if e.is_missing() {
            out.missing.push(e.clone());
        } else if e.is_misconfigured() {
            out.misconfigured.push(e.clone());
        } else {
            out.found.push(e.clone());
        }
    }
    out
}

/// Remediation list for missing or misconfigured headers, highest priority
/// first. The sort is stable so ties keep rule-table order.
pub fn recommend(evaluated: &[EvaluatedHeader]) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = evaluated
        .iter()
        .filter(|e| e.needs_fix())
        .map(|e| Recommendation {
            header: e.name.clone(),
            severity: e.severity,
            priority: e.severity.priority(),
            message: e.recommendation.clone(),
            description: e.description.clone(),
        })
        .collect();
    recs.sort_by(|a, b| b.priority.cmp(&a.priority));
    recs
}
