pub mod categorize;
pub mod csp;
pub mod engine;
pub mod evaluator;
pub mod fingerprint;
pub mod hsts;
pub mod rules;

use std::collections::HashMap;

/// Response headers keyed by lowercased name.
pub type HeaderMap = HashMap<String, String>;

pub use categorize::{categorize, recommend, CategorizedHeaders, Recommendation};
pub use csp::{validate_csp, CspDirective, CspReport};
pub use engine::{AnalysisResult, Analyzer};
pub use evaluator::{evaluate, evaluate_all, EvaluatedHeader};
pub use hsts::{check_hsts_preload, HstsConfig};
pub use rules::{default_rules, HeaderRule, Severity, Validation};
