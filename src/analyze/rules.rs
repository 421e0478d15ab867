use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::csp::validate_csp;
use super::hsts::{check_hsts_preload, PRELOAD_MIN_MAX_AGE};

/// Risk classification of a header rule. Ordering is `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Sort key for remediation ordering.
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Critical => 100,
            Severity::High => 75,
            Severity::Medium => 50,
            Severity::Low => 25,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a present header value earns full credit.
#[derive(Clone)]
pub enum Validation {
    /// Full credit for being present at all.
    Presence,
    /// Trimmed value must equal this string exactly.
    Exact(&'static str),
    /// Trimmed value must match this pattern.
    Pattern(Regex),
    /// Arbitrary predicate over the raw value.
    Validator(fn(&str) -> bool),
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Presence => f.write_str("Presence"),
            Validation::Exact(s) => f.debug_tuple("Exact").field(s).finish(),
            Validation::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Validation::Validator(_) => f.write_str("Validator(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub name: &'static str,
    pub required: bool,
    pub weight: f64,
    pub severity: Severity,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub validation: Validation,
}

impl HeaderRule {
    pub fn matches_name(&self, header: &str) -> bool {
        self.name.eq_ignore_ascii_case(header)
    }
}

const SAFE_REFERRER_POLICIES: [&str; 4] = [
    "no-referrer",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
];

fn csp_is_safe(value: &str) -> bool {
    validate_csp(value).is_valid
}

fn hsts_is_long_lived(value: &str) -> bool {
    check_hsts_preload(value).max_age >= PRELOAD_MIN_MAX_AGE
}

/// Browsers honour the last recognised token of a comma-separated list.
fn referrer_policy_is_safe(value: &str) -> bool {
    value
        .split(',')
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .last()
        .map(|t| SAFE_REFERRER_POLICIES.contains(&t.as_str()))
        .unwrap_or(false)
}

fn pattern(re: &str) -> Validation {
    // Patterns are literals below; a typo here is caught by the rule table tests.
    Validation::Pattern(Regex::new(re).expect("rule pattern must compile"))
}

static DEFAULT_RULES: Lazy<Vec<HeaderRule>> = Lazy::new(|| {
    vec![
        HeaderRule {
            name: "Content-Security-Policy",
            required: true,
            weight: 25.0,
            severity: Severity::Critical,
            description: "Restricts where scripts, styles and other resources may load from, the main defence against XSS.",
            recommendation: "Add a Content-Security-Policy with a default-src fallback and without 'unsafe-inline', 'unsafe-eval' or wildcard sources",
            validation: Validation::Validator(csp_is_safe),
        },
        HeaderRule {
            name: "Strict-Transport-Security",
            required: true,
            weight: 20.0,
            severity: Severity::High,
            description: "Forces browsers to use HTTPS for every future request to this host.",
            recommendation: "Set Strict-Transport-Security with max-age of at least 31536000, includeSubDomains and preload",
            validation: Validation::Validator(hsts_is_long_lived),
        },
        HeaderRule {
            name: "X-Frame-Options",
            required: true,
            weight: 15.0,
            severity: Severity::High,
            description: "Prevents the page from being framed by other origins (clickjacking).",
            recommendation: "Set X-Frame-Options to DENY or SAMEORIGIN",
            validation: pattern(r"(?i)^(DENY|SAMEORIGIN)$"),
        },
        HeaderRule {
            name: "X-Content-Type-Options",
            required: true,
            weight: 10.0,
            severity: Severity::Medium,
            description: "Stops browsers from MIME-sniffing responses away from the declared content type.",
            recommendation: "Set X-Content-Type-Options to nosniff",
            validation: Validation::Exact("nosniff"),
        },
        HeaderRule {
            name: "Referrer-Policy",
            required: true,
            weight: 10.0,
            severity: Severity::Medium,
            description: "Controls how much of the URL is leaked in the Referer header to other sites.",
            recommendation: "Set Referrer-Policy to strict-origin-when-cross-origin or stricter",
            validation: Validation::Validator(referrer_policy_is_safe),
        },
        HeaderRule {
            name: "Permissions-Policy",
            required: true,
            weight: 10.0,
            severity: Severity::Medium,
            description: "Restricts powerful browser features such as camera, microphone and geolocation.",
            recommendation: "Add a Permissions-Policy that disables features the site does not use",
            validation: Validation::Presence,
        },
        HeaderRule {
            name: "Cross-Origin-Opener-Policy",
            required: false,
            weight: 4.0,
            severity: Severity::Low,
            description: "Isolates the browsing context from cross-origin windows.",
            recommendation: "Set Cross-Origin-Opener-Policy to same-origin",
            validation: pattern(r"^same-origin(-allow-popups)?$"),
        },
        HeaderRule {
            name: "Cross-Origin-Embedder-Policy",
            required: false,
            weight: 3.0,
            severity: Severity::Low,
            description: "Requires embedded resources to opt in to being loaded cross-origin.",
            recommendation: "Set Cross-Origin-Embedder-Policy to require-corp",
            validation: pattern(r"^(require-corp|credentialless)$"),
        },
        HeaderRule {
            name: "Cross-Origin-Resource-Policy",
            required: false,
            weight: 3.0,
            severity: Severity::Low,
            description: "Limits which origins may embed this response as a resource.",
            recommendation: "Set Cross-Origin-Resource-Policy to same-origin",
            validation: pattern(r"^(same-origin|same-site)$"),
        },
    ]
});

/// The built-in rule table, in tie-break order.
pub fn default_rules() -> &'static [HeaderRule] {
    &DEFAULT_RULES
}

/// Scoring denominator for a rule table.
pub fn max_score(rules: &[HeaderRule]) -> f64 {
    rules.iter().map(|r| r.weight).sum()
}

pub fn find_rule<'a>(rules: &'a [HeaderRule], name: &str) -> Option<&'a HeaderRule> {
    rules.iter().find(|r| r.matches_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn weights_sum_to_one_hundred() {
        assert_eq!(max_score(default_rules()), 100.0);
        assert!(default_rules().iter().all(|r| r.weight > 0.0));
    }

    #[test]
    fn names_are_unique_case_insensitively() {
        let names: HashSet<String> = default_rules()
            .iter()
            .map(|r| r.name.to_ascii_lowercase())
            .collect();
        assert_eq!(names.len(), default_rules().len());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::Critical.priority(), 100);
        assert_eq!(Severity::Low.priority(), 25);
    }

    #[test]
    fn referrer_policy_uses_last_token() {
        assert!(referrer_policy_is_safe("strict-origin-when-cross-origin"));
        assert!(referrer_policy_is_safe("unsafe-url, no-referrer"));
        assert!(!referrer_policy_is_safe("no-referrer, unsafe-url"));
        assert!(!referrer_policy_is_safe(""));
    }

    #[test]
    fn find_rule_ignores_case() {
        let rule = find_rule(default_rules(), "x-frame-options").unwrap();
        assert_eq!(rule.name, "X-Frame-Options");
    }
}
