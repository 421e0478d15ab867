use once_cell::sync::Lazy;
use regex::Regex;

use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::document::{is_fixed_header, quote};
use crate::fixes::platform::{FrameworkConfig, Platform};

static ADD_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*add_header\s+([A-Za-z0-9_-]+)\s").expect("add_header pattern must compile"));
static SERVER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*server\s*\{").expect("server block pattern must compile"));

/// `add_header` directives. Existing content is merged line-wise: directives
/// for headers being fixed are removed and the new set is added to every
/// `server` block, since a block with its own `add_header` inherits none.
pub struct NginxGenerator;

fn directives(fixes: &[SecurityFix], indent: &str) -> String {
    let mut out = format!("{indent}# Security headers\n");
    for fix in fixes {
        out.push_str(&format!("{indent}add_header {} {} always;\n", fix.header, quote(&fix.value)));
    }
    out
}

/// Brace counts of the code part of a line, ignoring `#` comments.
fn braces(line: &str) -> (i64, i64) {
    let code = line.split('#').next().unwrap_or_default();
    (code.matches('{').count() as i64, code.matches('}').count() as i64)
}

fn merge(existing: &str, fixes: &[SecurityFix]) -> String {
    let kept: Vec<&str> = existing
        .lines()
        .filter(|line| {
            ADD_HEADER_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|name| !is_fixed_header(fixes, name.as_str()))
                .unwrap_or(true)
        })
        .collect();

    if !kept.iter().any(|l| SERVER_LINE_RE.is_match(l)) {
        let mut out = kept.join("\n");
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&directives(fixes, ""));
        return out;
    }

    // (depth outside the block, indent of the `server` line)
    let mut open_servers: Vec<(i64, String)> = Vec::new();
    let mut depth: i64 = 0;
    let mut out = String::new();
    for line in kept {
        let (opens, closes) = braces(line);
        let after = depth + opens - closes;
        if SERVER_LINE_RE.is_match(line) && after > depth {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            open_servers.push((depth, indent));
        } else if let Some((outer, indent)) = open_servers.last() {
            if closes > 0 && after <= *outer {
                out.push_str(&directives(fixes, &format!("{indent}    ")));
                open_servers.pop();
            }
        }
        depth = after;
        out.push_str(line);
        out.push('\n');
    }
    out
}

impl PatchGenerator for NginxGenerator {
    fn platform(&self) -> Platform {
        Platform::Nginx
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        match existing.existing() {
            Some(content) => merge(content, fixes),
            None => directives(fixes, ""),
        }
    }
}
