use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyze::evaluator::EvaluatedHeader;
use crate::analyze::rules::{HeaderRule, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixAction {
    /// Header is absent and must be added.
    Add,
    /// Header is present with a substandard value.
    Update,
}

impl FixAction {
    pub fn label(&self) -> &'static str {
        match self {
            FixAction::Add => "add",
            FixAction::Update => "update",
        }
    }
}

/// One header/value pair needed to remediate an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFix {
    pub header: String,
    pub value: String,
    pub description: String,
    pub reference: Option<String>,
    pub action: FixAction,
    pub severity: Severity,
}

/// Canonical safe default for one header.
#[derive(Debug, Clone, Copy)]
pub struct CannedFix {
    pub header: &'static str,
    pub value: &'static str,
    pub description: &'static str,
    pub reference: &'static str,
}

/// Canonical fixes, in header-priority order (the secondary sort key).
pub const FIX_TABLE: &[CannedFix] = &[
    CannedFix {
        header: "Content-Security-Policy",
        value: "default-src 'self'; script-src 'self'; style-src 'self'; img-src 'self' data:; font-src 'self'; object-src 'none'; base-uri 'self'; form-action 'self'; frame-ancestors 'none'",
        description: "Restrict resource loading to same origin and block plugins and framing",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Security-Policy",
    },
    CannedFix {
        header: "Strict-Transport-Security",
        value: "max-age=31536000; includeSubDomains; preload",
        description: "Enforce HTTPS for one year on all subdomains and allow preload listing",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Strict-Transport-Security",
    },
    CannedFix {
        header: "X-Frame-Options",
        value: "DENY",
        description: "Forbid framing of the site to prevent clickjacking",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/X-Frame-Options",
    },
    CannedFix {
        header: "X-Content-Type-Options",
        value: "nosniff",
        description: "Disable MIME type sniffing",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/X-Content-Type-Options",
    },
    CannedFix {
        header: "Referrer-Policy",
        value: "strict-origin-when-cross-origin",
        description: "Send only the origin to other sites and nothing over downgraded connections",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Referrer-Policy",
    },
    CannedFix {
        header: "Permissions-Policy",
        value: "camera=(), microphone=(), geolocation=(), payment=(), usb=()",
        description: "Disable powerful browser features the site does not need",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Permissions-Policy",
    },
    CannedFix {
        header: "Cross-Origin-Opener-Policy",
        value: "same-origin",
        description: "Isolate the browsing context from cross-origin popups",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cross-Origin-Opener-Policy",
    },
    CannedFix {
        header: "Cross-Origin-Embedder-Policy",
        value: "require-corp",
        description: "Only load cross-origin resources that explicitly opt in",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cross-Origin-Embedder-Policy",
    },
    CannedFix {
        header: "Cross-Origin-Resource-Policy",
        value: "same-origin",
        description: "Prevent other origins from embedding responses",
        reference: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cross-Origin-Resource-Policy",
    },
];

pub fn canned_fix(header: &str) -> Option<&'static CannedFix> {
    FIX_TABLE.iter().find(|f| f.header.eq_ignore_ascii_case(header))
}

fn header_priority(header: &str) -> usize {
    FIX_TABLE
        .iter()
        .position(|f| f.header.eq_ignore_ascii_case(header))
        .unwrap_or(FIX_TABLE.len())
}

/// Rule names with no canonical fix.
pub fn check_fix_parity(rules: &[HeaderRule]) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|r| canned_fix(r.name).is_none())
        .map(|r| r.name)
        .collect()
}

/// Builds the Fix-Set: one fix per missing or misconfigured header with a
/// canonical value, ordered by severity then header priority. Headers with
/// no canned fix are skipped.
pub fn build_fixes(evaluated: &[EvaluatedHeader]) -> Vec<SecurityFix> {
    let mut fixes: Vec<SecurityFix> = evaluated
        .iter()
        .filter(|e| e.needs_fix())
        .filter_map(|e| {
            let Some(canned) = canned_fix(&e.name) else {
                debug!(header = %e.name, "no canonical fix, skipping");
                return None;
            };
            Some(SecurityFix {
                header: canned.header.to_string(),
                value: canned.value.to_string(),
                description: canned.description.to_string(),
                reference: Some(canned.reference.to_string()),
                action: if e.present { FixAction::Update } else { FixAction::Add },
                severity: e.severity,
            })
        })
        .collect();

    fixes.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| header_priority(&a.header).cmp(&header_priority(&b.header)))
    });
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::csp::validate_csp;
    use crate::analyze::evaluator::evaluate_all;
    use crate::analyze::hsts::check_hsts_preload;
    use crate::analyze::rules::{default_rules, find_rule, Validation};
    use crate::analyze::HeaderMap;

    #[test]
    fn every_rule_has_a_canonical_fix() {
        assert!(check_fix_parity(default_rules()).is_empty());
        for rule in default_rules().iter().filter(|r| r.required) {
            assert!(canned_fix(rule.name).is_some(), "{} lacks a fix", rule.name);
        }
    }

    #[test]
    fn canonical_values_satisfy_their_own_rules() {
        for fix in FIX_TABLE {
            let rule = find_rule(default_rules(), fix.header).unwrap();
            let ok = match &rule.validation {
                Validation::Presence => true,
                Validation::Exact(v) => fix.value == *v,
                Validation::Pattern(re) => re.is_match(fix.value),
                Validation::Validator(f) => f(fix.value),
            };
            assert!(ok, "canonical {} value fails its rule", fix.header);
        }
        assert!(validate_csp(FIX_TABLE[0].value).is_valid);
        assert!(check_hsts_preload(FIX_TABLE[1].value).is_eligible);
    }

    #[test]
    fn empty_headers_yield_fix_per_rule_in_order() {
        let fixes = build_fixes(&evaluate_all(default_rules(), &HeaderMap::new()));
        assert_eq!(fixes.len(), default_rules().len());
        assert!(fixes.iter().all(|f| f.action == FixAction::Add));
        assert_eq!(fixes[0].header, "Content-Security-Policy");
        assert_eq!(fixes[1].header, "Strict-Transport-Security");
        assert_eq!(fixes[2].header, "X-Frame-Options");
        assert_eq!(fixes.last().unwrap().header, "Cross-Origin-Resource-Policy");
    }

    #[test]
    fn misconfigured_header_is_an_update() {
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options".into(), "ALLOW-FROM https://x.com".into());
        let fixes = build_fixes(&evaluate_all(default_rules(), &headers));
        let xfo = fixes.iter().find(|f| f.header == "X-Frame-Options").unwrap();
        assert_eq!(xfo.action, FixAction::Update);
        assert_eq!(xfo.value, "DENY");
    }

    #[test]
    fn unknown_header_is_skipped() {
        let mut evaluated = evaluate_all(default_rules(), &HeaderMap::new());
        evaluated[0].name = "X-Made-Up".into();
        let fixes = build_fixes(&evaluated);
        assert_eq!(fixes.len(), default_rules().len() - 1);
        assert!(fixes.iter().all(|f| f.header != "X-Made-Up"));
    }
}
