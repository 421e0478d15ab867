use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::platform::{FrameworkConfig, Platform};

/// Structural sanity check result. Warnings never block a patch; the
/// publisher decides whether to proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
}

fn balanced(text: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    for c in text.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

fn check_vercel(patch: &str, warnings: &mut Vec<String>) {
    match serde_json::from_str::<Value>(patch) {
        Ok(Value::Object(map)) => {
            if !map.get("headers").map(Value::is_array).unwrap_or(false) {
                warnings.push("vercel.json has no \"headers\" array".to_string());
            }
        }
        Ok(_) => warnings.push("vercel.json must be a JSON object".to_string()),
        Err(e) => warnings.push(format!("vercel.json is not valid JSON: {e}")),
    }
}

fn check_nextjs(patch: &str, warnings: &mut Vec<String>) {
    if !patch.contains("headers()") {
        warnings.push("next.config.js does not define an async headers() function".to_string());
    }
    if !balanced(patch, '{', '}') {
        warnings.push("next.config.js has unbalanced braces".to_string());
    }
    if !balanced(patch, '[', ']') {
        warnings.push("next.config.js has unbalanced brackets".to_string());
    }
}

fn check_nginx(patch: &str, warnings: &mut Vec<String>) {
    if !patch.contains("add_header") {
        warnings.push("nginx patch contains no add_header directive".to_string());
    }
    for (i, line) in patch.lines().enumerate() {
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if !(t.ends_with(';') || t.ends_with('{') || t.ends_with('}')) {
            warnings.push(format!("nginx line {} is not terminated with ';': {}", i + 1, t));
        }
    }
}

fn check_apache(patch: &str, warnings: &mut Vec<String>) {
    if !patch.contains("Header") {
        warnings.push("apache patch contains no Header directive".to_string());
    }
    let opens = patch.matches("<IfModule").count();
    let closes = patch.matches("</IfModule>").count();
    if opens != closes {
        warnings.push(format!("apache patch has {opens} <IfModule> but {closes} </IfModule>"));
    }
}

fn check_netlify(patch: &str, warnings: &mut Vec<String>) {
    let mut lines = patch
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'));
    match lines.next() {
        Some(first) if first.starts_with('/') => {}
        Some(first) => warnings.push(format!("_headers must start with a path rule, found: {}", first.trim())),
        None => {}
    }
    for line in lines {
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented && !line.contains(':') {
            warnings.push(format!("_headers line is not 'Name: value': {}", line.trim()));
        }
    }
}

fn check_express(patch: &str, warnings: &mut Vec<String>) {
    if !patch.contains("setHeader") {
        warnings.push("express middleware never calls res.setHeader".to_string());
    }
}

fn check_listing(patch: &str, warnings: &mut Vec<String>) {
    for line in patch.lines() {
        let t = line.trim();
        if !t.is_empty() && !t.starts_with('#') && !t.contains(':') {
            warnings.push(format!("line is not 'Header: value': {t}"));
        }
    }
}

/// File names the platform only reads under a fixed name. Server configs
/// can be included from anywhere.
fn required_file_name(platform: &Platform) -> Option<&'static str> {
    match platform {
        Platform::NextJs => Some("next.config.js"),
        Platform::Netlify => Some("_headers"),
        Platform::Vercel => Some("vercel.json"),
        _ => None,
    }
}

/// Runs the platform's structural checks. Never inspects header semantics.
pub fn validate_patch(config: &FrameworkConfig, patch: &str) -> PatchValidation {
    let mut warnings = Vec::new();

    if patch.trim().is_empty() {
        warnings.push("patch is empty".to_string());
        return PatchValidation { valid: false, warnings };
    }

    if let Some(expected) = required_file_name(&config.platform) {
        let file_name = config.config_file.rsplit('/').next().unwrap_or(&config.config_file);
        if file_name != expected {
            warnings.push(format!(
                "config file '{}' does not look like a {} config (expected {})",
                config.config_file,
                config.platform.display_name(),
                expected
            ));
        }
    }

    match config.platform {
        Platform::Vercel => check_vercel(patch, &mut warnings),
        Platform::NextJs => check_nextjs(patch, &mut warnings),
        Platform::Nginx => check_nginx(patch, &mut warnings),
        Platform::Apache => check_apache(patch, &mut warnings),
        Platform::Netlify => check_netlify(patch, &mut warnings),
        Platform::Express => check_express(patch, &mut warnings),
        Platform::Generic | Platform::Other(_) => check_listing(patch, &mut warnings),
    }

    PatchValidation {
        valid: warnings.is_empty(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::generators::generate_patch;
    use crate::fixes::generators::test_support::sample_fixes;

    #[test]
    fn generated_patches_validate_cleanly() {
        for platform in Platform::SUPPORTED.iter() {
            let cfg = FrameworkConfig::new(platform.clone());
            let patch = generate_patch(&cfg, &sample_fixes());
            let result = validate_patch(&cfg, &patch);
            assert!(result.valid, "{platform}: {:?}", result.warnings);
        }
    }

    #[test]
    fn broken_json_warns() {
        let cfg = FrameworkConfig::new(Platform::Vercel);
        let result = validate_patch(&cfg, "{\"headers\": [");
        assert!(!result.valid);
        assert!(result.warnings[0].contains("not valid JSON"));
    }

    #[test]
    fn empty_patch_warns() {
        let result = validate_patch(&FrameworkConfig::new(Platform::Nginx), "  ");
        assert_eq!(result.warnings, vec!["patch is empty"]);
    }

    #[test]
    fn unterminated_nginx_line_warns() {
        let cfg = FrameworkConfig::new(Platform::Nginx);
        let result = validate_patch(&cfg, "add_header X-Frame-Options \"DENY\" always");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn unexpected_file_name_warns() {
        let mut cfg = FrameworkConfig::new(Platform::Vercel);
        cfg.config_file = "config/now.json".into();
        let result = validate_patch(&cfg, "{\"headers\": []}");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("expected vercel.json"));
    }

    #[test]
    fn next_config_without_headers_fn_warns() {
        let cfg = FrameworkConfig::new(Platform::NextJs);
        let result = validate_patch(&cfg, "module.exports = {};");
        assert!(!result.valid);
    }
}
