use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{HeaderRule, Severity, Validation};
use super::HeaderMap;

/// Share of the weight awarded to an absent optional header.
pub const OPTIONAL_ABSENT_CREDIT: f64 = 0.3;
/// Share of the weight awarded to a present header whose value fails validation.
pub const MISMATCH_CREDIT: f64 = 0.5;

/// Result of applying one rule to one header snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedHeader {
    pub name: String,
    pub present: bool,
    pub value: Option<String>,
    pub score: f64,
    pub max_score: f64,
    pub required: bool,
    pub severity: Severity,
    pub recommendation: String,
    pub description: String,
}

impl EvaluatedHeader {
    pub fn is_missing(&self) -> bool {
        !self.present
    }

    pub fn is_misconfigured(&self) -> bool {
        self.present && self.score < self.max_score
    }

    pub fn needs_fix(&self) -> bool {
        self.is_missing() || self.is_misconfigured()
    }
}

/// Case-insensitive header lookup. Keys are normally lowercased by the header source.
pub fn lookup<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(&name.to_ascii_lowercase()) {
        return Some(v.as_str());
    }
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn value_passes(validation: &Validation, value: &str) -> bool {
    match validation {
        Validation::Presence => true,
        Validation::Exact(expected) => value.trim() == *expected,
        Validation::Pattern(re) => re.is_match(value.trim()),
        Validation::Validator(check) => check(value),
    }
}

pub fn evaluate(rule: &HeaderRule, headers: &HeaderMap) -> EvaluatedHeader {
    let value = lookup(headers, rule.name);

    let (score, recommendation) = match value {
        None if rule.required => (0.0, rule.recommendation.to_string()),
        None => (
            rule.weight * OPTIONAL_ABSENT_CREDIT,
            format!("Optional: {}", rule.recommendation),
        ),
        Some(v) if value_passes(&rule.validation, v) => (rule.weight, rule.recommendation.to_string()),
        Some(v) => (
            rule.weight * MISMATCH_CREDIT,
            format!("{} (current value: \"{}\")", rule.recommendation, v),
        ),
    };

    debug!(header = rule.name, present = value.is_some(), score, max = rule.weight, "evaluated header");

    EvaluatedHeader {
        name: rule.name.to_string(),
        present: value.is_some(),
        value: value.map(str::to_string),
        score,
        max_score: rule.weight,
        required: rule.required,
        severity: rule.severity,
        recommendation,
        description: rule.description.to_string(),
    }
}

/// Evaluates every rule, in table order.
pub fn evaluate_all(rules: &[HeaderRule], headers: &HeaderMap) -> Vec<EvaluatedHeader> {
    rules.iter().map(|rule| evaluate(rule, headers)).collect()
}
