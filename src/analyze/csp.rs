use serde::{Deserialize, Serialize};

const UNSAFE_SOURCES: [&str; 3] = ["'unsafe-inline'", "'unsafe-eval'", "*"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspDirective {
    pub directive: String,
    pub sources: Vec<String>,
    pub is_unsafe: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspReport {
    pub is_valid: bool,
    pub directives: Vec<CspDirective>,
    pub issues: Vec<String>,
}

impl CspReport {
    pub fn directive(&self, name: &str) -> Option<&CspDirective> {
        self.directives
            .iter()
            .find(|d| d.directive.eq_ignore_ascii_case(name))
    }

    /// Re-serializes the parsed directives in their original order.
    pub fn to_policy(&self) -> String {
        self.directives
            .iter()
            .map(|d| {
                if d.sources.is_empty() {
                    d.directive.clone()
                } else {
                    format!("{} {}", d.directive, d.sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn describe_unsafe(directive: &str, token: &str) -> String {
    match token {
        "*" => format!("{directive} allows wildcard source (*) — any origin can serve content"),
        "'unsafe-inline'" => format!("{directive} allows 'unsafe-inline' — inline scripts/styles bypass the policy"),
        _ => format!("{directive} allows 'unsafe-eval' — string-to-code evaluation is permitted"),
    }
}

/// Parses a Content-Security-Policy value and flags unsafe sources.
pub fn validate_csp(policy: &str) -> CspReport {
    if policy.trim().is_empty() {
        return CspReport {
            is_valid: false,
            directives: Vec::new(),
            issues: vec!["CSP policy is empty".to_string()],
        };
    }

    let mut directives = Vec::new();
    let mut issues = Vec::new();

    for segment in policy.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let mut tokens = segment.split_whitespace();
        let Some(name) = tokens.next() else { continue };
        let sources: Vec<String> = tokens.map(str::to_string).collect();

        let mut is_unsafe = false;
        for token in UNSAFE_SOURCES {
            if sources.iter().any(|s| s == token) {
                is_unsafe = true;
                issues.push(describe_unsafe(name, token));
            }
        }

        directives.push(CspDirective {
            directive: name.to_string(),
            sources,
            is_unsafe,
        });
    }

    if !directives
        .iter()
        .any(|d| d.directive.eq_ignore_ascii_case("default-src"))
    {
        issues.push("Missing default-src directive — required as fallback".to_string());
    }

    CspReport {
        is_valid: issues.is_empty(),
        directives,
        issues,
    }
}
