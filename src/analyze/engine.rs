use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::fixes::builder::{build_fixes, canned_fix, SecurityFix};
use crate::fixes::generators::{generate_for_configs, generate_for_platforms};
use crate::fixes::platform::{FrameworkConfig, Platform};
use crate::scoring::{grade, score, Grade};

use super::categorize::{categorize, recommend, CategorizedHeaders, Recommendation};
use super::evaluator::{evaluate_all, EvaluatedHeader};
use super::fingerprint::detect_platform;
use super::rules::{default_rules, HeaderRule};
use super::HeaderMap;

/// Outcome of analysing one header snapshot. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub score: u8,
    pub grade: Grade,
    pub headers: CategorizedHeaders,
    pub recommendations: Vec<Recommendation>,
    /// The Fix-Set the rendered patches implement.
    pub fix_set: Vec<SecurityFix>,
    /// Rendered patch text per platform.
    pub fixes: BTreeMap<Platform, String>,
    pub framework: Option<Platform>,
}

impl AnalysisResult {
    /// All evaluated headers, bucket by bucket.
    pub fn evaluated(&self) -> impl Iterator<Item = &EvaluatedHeader> {
        self.headers
            .found
            .iter()
            .chain(self.headers.missing.iter())
            .chain(self.headers.misconfigured.iter())
    }
}

pub fn default_platforms() -> Vec<Platform> {
    vec![
        Platform::Nginx,
        Platform::Apache,
        Platform::NextJs,
        Platform::Netlify,
        Platform::Vercel,
    ]
}

/// The header-analysis engine. Holds only immutable data, so one instance
/// can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Analyzer {
    rules: Vec<HeaderRule>,
    platforms: Vec<Platform>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Engine over the built-in rule table.
    pub fn new() -> Self {
        Self {
            rules: default_rules().to_vec(),
            platforms: default_platforms(),
        }
    }

    /// Engine over a custom rule table. Rejects duplicate names and required
    /// rules without a canonical fix; optional rules without one are only
    /// logged, and will never appear in a Fix-Set.
    pub fn with_rules(rules: Vec<HeaderRule>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateRule(rule.name.to_string()));
            }
            if canned_fix(rule.name).is_none() {
                if rule.required {
                    return Err(ConfigError::MissingFix(rule.name.to_string()));
                }
                warn!(header = rule.name, "optional rule has no canonical fix and will never be remediated");
            }
        }
        Ok(Self {
            rules,
            platforms: default_platforms(),
        })
    }

    /// Platforms rendered into `AnalysisResult::fixes`.
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn evaluate(&self, headers: &HeaderMap) -> Vec<EvaluatedHeader> {
        evaluate_all(&self.rules, headers)
    }

    pub fn analyze(&self, url: &str, headers: &HeaderMap) -> AnalysisResult {
        self.analyze_at(url, headers, Utc::now())
    }

    /// Same as [`Analyzer::analyze`] with an explicit timestamp, which makes
    /// the whole result a pure function of its inputs.
    pub fn analyze_at(&self, url: &str, headers: &HeaderMap, timestamp: DateTime<Utc>) -> AnalysisResult {
        let evaluated = self.evaluate(headers);
        let score = score(&evaluated);
        let grade = grade(score);
        let framework = detect_platform(headers);

        let mut platforms = self.platforms.clone();
        if let Some(detected) = &framework {
            if !platforms.contains(detected) {
                platforms.push(detected.clone());
            }
        }

        let fix_set = build_fixes(&evaluated);
        let fixes = if fix_set.is_empty() {
            BTreeMap::new()
        } else {
            generate_for_platforms(&platforms, &fix_set)
        };

        info!(url, score, grade = %grade, fixes = fix_set.len(), "analysis complete");

        AnalysisResult {
            url: url.to_string(),
            timestamp,
            score,
            grade,
            headers: categorize(&evaluated),
            recommendations: recommend(&evaluated),
            fix_set,
            fixes,
            framework,
        }
    }

    /// Analyses pre-fetched snapshots in parallel. Order of the output
    /// matches the input.
    pub fn analyze_snapshots(&self, snapshots: &[(String, HeaderMap)]) -> Vec<AnalysisResult> {
        snapshots
            .par_iter()
            .map(|(url, headers)| self.analyze(url, headers))
            .collect()
    }

    /// Renders the Fix-Set of `evaluated` as fresh files for each platform.
    pub fn generate_fixes(&self, evaluated: &[EvaluatedHeader], platforms: &[Platform]) -> BTreeMap<Platform, String> {
        generate_for_platforms(platforms, &build_fixes(evaluated))
    }

    /// Renders the Fix-Set of `evaluated`, merging with caller-supplied configs.
    pub fn generate_fixes_with(
        &self,
        evaluated: &[EvaluatedHeader],
        configs: &[FrameworkConfig],
    ) -> BTreeMap<Platform, String> {
        generate_for_configs(configs, &build_fixes(evaluated))
    }
}
