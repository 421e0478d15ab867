use once_cell::sync::Lazy;
use regex::Regex;

use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::document::js_string;
use crate::fixes::platform::{FrameworkConfig, Platform};

static HEADERS_ARRAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:headers\s*:\s*\[|(?:const|let|var)\s+\w*[Hh]eaders\s*=\s*\[)")
        .expect("headers array pattern must compile")
});
static CONFIG_OBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:const\s+nextConfig\s*=\s*\{|module\.exports\s*=\s*\{|export\s+default\s*\{)")
        .expect("config object pattern must compile")
});
static RETURN_ARRAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"async\s+headers\s*\(\s*\)\s*\{\s*return\s*\[").expect("headers return pattern must compile")
});

/// `next.config.js` with an `async headers()` route matching every path.
pub struct NextJsGenerator;

fn entry(fix: &SecurityFix, indent: &str) -> String {
    format!("{indent}{{ key: {}, value: {} }},\n", js_string(&fix.header), js_string(&fix.value))
}

/// One `{ source: '/(.*)', headers: [...] }` route for the returned array.
fn route_entry(fixes: &[SecurityFix]) -> String {
    let mut out = String::from("\n      {\n        source: '/(.*)',\n        headers: [\n");
    for fix in fixes {
        out.push_str(&entry(fix, "          "));
    }
    out.push_str("        ],\n      },\n");
    out
}

fn headers_method(fixes: &[SecurityFix]) -> String {
    format!("\n  async headers() {{\n    return [{}    ];\n  }},\n", route_entry(fixes))
}

fn security_headers_const(fixes: &[SecurityFix]) -> String {
    let mut out = String::from("const securityHeaders = [\n");
    for fix in fixes {
        out.push_str(&entry(fix, "  "));
    }
    out.push_str("];\n");
    out
}

fn fresh_config(fixes: &[SecurityFix]) -> String {
    let mut out = String::from("/** @type {import('next').NextConfig} */\n");
    out.push_str(&security_headers_const(fixes));
    out.push('\n');
    out.push_str("const nextConfig = {\n");
    out.push_str("  async headers() {\n");
    out.push_str("    return [\n");
    out.push_str("      {\n");
    out.push_str("        source: '/(.*)',\n");
    out.push_str("        headers: securityHeaders,\n");
    out.push_str("      },\n");
    out.push_str("    ];\n");
    out.push_str("  },\n");
    out.push_str("};\n\n");
    out.push_str("module.exports = nextConfig;\n");
    out
}

/// Keeps a config we cannot splice into and puts the headers in a const
/// above it, for the user to wire in.
fn prepend_const(content: &str, fixes: &[SecurityFix]) -> String {
    let mut out = String::from("// Security headers: spread `...securityHeaders` into the headers of your catch-all route.\n");
    out.push_str(&security_headers_const(fixes));
    out.push('\n');
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Removes `{ key: 'Name', value: ... }` objects for headers being replaced.
fn drop_stale_entries(content: &str, fixes: &[SecurityFix]) -> String {
    let mut out = content.to_string();
    for fix in fixes {
        let pattern = format!(
            r#"(?i)[ \t]*\{{\s*key\s*:\s*['"`]{}['"`]\s*,\s*value\s*:\s*(?:'[^']*'|"[^"]*"|`[^`]*`)\s*\}}\s*,?[ \t]*\n?"#,
            regex::escape(&fix.header)
        );
        if let Ok(re) = Regex::new(&pattern) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}

impl PatchGenerator for NextJsGenerator {
    fn platform(&self) -> Platform {
        Platform::NextJs
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let Some(content) = existing.existing() else {
            return fresh_config(fixes);
        };

        let content = drop_stale_entries(content, fixes);

        if let Some(m) = HEADERS_ARRAY_RE.find(&content) {
            let rest = &content[m.end()..];
            // Match the indentation of the first existing entry.
            let indent: String = rest
                .strip_prefix('\n')
                .map(|r| r.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
                .unwrap_or_else(|| "  ".to_string());
            let mut out = String::with_capacity(content.len() + fixes.len() * 64);
            out.push_str(&content[..m.end()]);
            for fix in fixes {
                out.push('\n');
                out.push_str(entry(fix, &indent).trim_end_matches('\n'));
            }
            if !rest.starts_with('\n') {
                out.push('\n');
            }
            out.push_str(rest);
            return out;
        }

        // headers() exists but builds its routes some other way.
        if let Some(m) = RETURN_ARRAY_RE.find(&content) {
            let mut out = String::with_capacity(content.len() + fixes.len() * 64);
            out.push_str(&content[..m.end()]);
            out.push_str(&route_entry(fixes));
            out.push_str(&content[m.end()..]);
            return out;
        }

        if !content.contains("headers()") {
            if let Some(m) = CONFIG_OBJECT_RE.find(&content) {
                let mut out = String::with_capacity(content.len() + fixes.len() * 64);
                out.push_str(&content[..m.end()]);
                out.push_str(&headers_method(fixes));
                out.push_str(&content[m.end()..]);
                return out;
            }
        }

        prepend_const(&content, fixes)
    }
}
