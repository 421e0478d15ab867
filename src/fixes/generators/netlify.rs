use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::document::HeaderDocument;
use crate::fixes::platform::{FrameworkConfig, Platform};

const CATCH_ALL: &str = "/*";

/// One path rule of a `_headers` file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathBlock {
    path: String,
    headers: HeaderDocument,
    /// Comment lines kept verbatim above the block.
    comments: Vec<String>,
}

/// A parsed `_headers` file. Comments after the last block are kept in
/// `trailing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct HeadersFile {
    blocks: Vec<PathBlock>,
    trailing: Vec<String>,
}

/// Parses the static-host `_headers` format: unindented path lines followed
/// by indented `Name: value` lines.
fn parse(content: &str) -> HeadersFile {
    let mut blocks: Vec<PathBlock> = Vec::new();
    let mut pending_comments = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            pending_comments.push(trimmed.to_string());
            continue;
        }
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if !indented {
            blocks.push(PathBlock {
                path: trimmed.to_string(),
                headers: HeaderDocument::new(),
                comments: std::mem::take(&mut pending_comments),
            });
            continue;
        }
        if let (Some(block), Some((name, value))) = (blocks.last_mut(), trimmed.split_once(':')) {
            block.headers.push(name.trim(), value.trim());
        }
    }
    HeadersFile {
        blocks,
        trailing: pending_comments,
    }
}

fn render(file: &HeadersFile) -> String {
    let mut out = file
        .blocks
        .iter()
        .map(|b| {
            let mut out = String::new();
            for c in &b.comments {
                out.push_str(c);
                out.push('\n');
            }
            out.push_str(&b.path);
            out.push('\n');
            for e in b.headers.entries() {
                out.push_str(&format!("  {}: {}\n", e.name, e.value));
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n");
    if !file.trailing.is_empty() {
        out.push('\n');
        for c in &file.trailing {
            out.push_str(c);
            out.push('\n');
        }
    }
    out
}

/// Netlify / static-host `_headers` file. Fixes are upserted into the `/*`
/// block; other path blocks are preserved.
pub struct NetlifyGenerator;

impl PatchGenerator for NetlifyGenerator {
    fn platform(&self) -> Platform {
        Platform::Netlify
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let mut file = existing.existing().map(parse).unwrap_or_default();

        match file.blocks.iter_mut().find(|b| b.path == CATCH_ALL) {
            Some(block) => block.headers.apply_fixes(fixes),
            None => file.blocks.insert(
                0,
                PathBlock {
                    path: CATCH_ALL.to_string(),
                    headers: HeaderDocument::from_fixes(fixes),
                    comments: vec!["# Security headers".to_string()],
                },
            ),
        }
        render(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::generators::test_support::{fix, sample_fixes};

    #[test]
    fn fresh_file() {
        let out = NetlifyGenerator.generate(&FrameworkConfig::new(Platform::Netlify), &sample_fixes());
        assert!(out.starts_with("# Security headers\n/*\n"));
        assert!(out.contains("  X-Frame-Options: DENY\n"));
    }

    #[test]
    fn upserts_into_catch_all_and_keeps_other_paths() {
        let existing = "/assets/*\n  Cache-Control: max-age=31536000\n\n/*\n  X-Frame-Options: SAMEORIGIN\n  X-Custom: kept\n";
        let cfg = FrameworkConfig::with_content(Platform::Netlify, existing);
        let out = NetlifyGenerator.generate(&cfg, &[fix("X-Frame-Options", "DENY"), fix("X-Content-Type-Options", "nosniff")]);
        assert_eq!(
            out,
            "/assets/*\n  Cache-Control: max-age=31536000\n\n/*\n  X-Frame-Options: DENY\n  X-Custom: kept\n  X-Content-Type-Options: nosniff\n"
        );
    }

    #[test]
    fn repeated_headers_and_trailing_comments_survive() {
        let existing = "/*\n  Link: </a.css>; rel=preload\n  Link: </b.css>; rel=preload\n# trailing note\n";
        let cfg = FrameworkConfig::with_content(Platform::Netlify, existing);
        let out = NetlifyGenerator.generate(&cfg, &[fix("X-Frame-Options", "DENY")]);
        assert_eq!(
            out,
            "/*\n  Link: </a.css>; rel=preload\n  Link: </b.css>; rel=preload\n  X-Frame-Options: DENY\n\n# trailing note\n"
        );
    }

    #[test]
    fn duplicate_fixed_header_lines_collapse() {
        let existing = "/*\n  X-Frame-Options: SAMEORIGIN\n  X-Frame-Options: ALLOWALL\n";
        let cfg = FrameworkConfig::with_content(Platform::Netlify, existing);
        let out = NetlifyGenerator.generate(&cfg, &[fix("X-Frame-Options", "DENY")]);
        assert_eq!(out, "/*\n  X-Frame-Options: DENY\n");
    }
}
