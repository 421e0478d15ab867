use once_cell::sync::Lazy;
use regex::Regex;

use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::document::{is_fixed_header, quote};
use crate::fixes::platform::{FrameworkConfig, Platform};

static HEADER_SET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*Header\s+(?:always\s+)?(?:set|append|add|merge)\s+([A-Za-z0-9_-]+)\s")
        .expect("Header directive pattern must compile")
});

/// `.htaccess` / vhost `Header always set` directives wrapped in `mod_headers`.
pub struct ApacheGenerator;

fn block(fixes: &[SecurityFix]) -> String {
    let mut out = String::from("# Security headers\n<IfModule mod_headers.c>\n");
    for fix in fixes {
        out.push_str(&format!("    Header always set {} {}\n", fix.header, quote(&fix.value)));
    }
    out.push_str("</IfModule>\n");
    out
}

impl PatchGenerator for ApacheGenerator {
    fn platform(&self) -> Platform {
        Platform::Apache
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let Some(content) = existing.existing() else {
            return block(fixes);
        };

        let kept: Vec<&str> = content
            .lines()
            .filter(|line| {
                HEADER_SET_RE
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|name| !is_fixed_header(fixes, name.as_str()))
                    .unwrap_or(true)
            })
            .collect();

        let mut out = kept.join("\n");
        out.push_str("\n\n");
        out.push_str(&block(fixes));
        out
    }
}
