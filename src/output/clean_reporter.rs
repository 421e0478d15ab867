use crate::analyze::csp::CspReport;
use crate::analyze::hsts::HstsConfig;
use crate::analyze::rules::Severity;
use crate::analyze::AnalysisResult;
use crate::scoring::Grade;

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[1;91m", // Bright Red
        Severity::High => "\x1b[1;33m",     // Bright Yellow
        Severity::Medium => "\x1b[1;93m",   // Yellow
        Severity::Low => "\x1b[1;94m",      // Blue
    }
}

fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus | Grade::A => "\x1b[1;92m",
        Grade::B | Grade::C => "\x1b[1;93m",
        Grade::D | Grade::F => "\x1b[1;91m",
    }
}

const RESET: &str = "\x1b[0m";

/// Plain-text report of one analysis.
pub fn render_report(result: &AnalysisResult, color: bool) -> String {
    let paint = |code: &'static str| if color { code } else { "" };
    let reset = if color { RESET } else { "" };
    let mut out = String::new();

    out.push_str(&format!("[>] Target: {}\n", result.url));
    out.push_str(&format!(
        "[*] Score: {}{}/100 ({}){}\n",
        paint(grade_color(result.grade)),
        result.score,
        result.grade,
        reset
    ));
    if let Some(fw) = &result.framework {
        out.push_str(&format!("[*] Detected platform: {}\n", fw.display_name()));
    }

    out.push_str(&format!("\n[+] Found ({})\n", result.headers.found.len()));
    for h in &result.headers.found {
        out.push_str(&format!("    {}: {}\n", h.name, h.value.as_deref().unwrap_or_default()));
    }

    out.push_str(&format!("\n[!] Misconfigured ({})\n", result.headers.misconfigured.len()));
    for h in &result.headers.misconfigured {
        out.push_str(&format!("    {}: {}\n", h.name, h.value.as_deref().unwrap_or_default()));
    }

    out.push_str(&format!("\n[-] Missing ({})\n", result.headers.missing.len()));
    for h in &result.headers.missing {
        let tag = if h.required { "" } else { " (optional)" };
        out.push_str(&format!("    {}{}\n", h.name, tag));
    }

    if !result.recommendations.is_empty() {
        out.push_str("\n[~] Recommendations\n");
        for rec in &result.recommendations {
            out.push_str(&format!(
                "    {}[{}]{} {}: {}\n",
                paint(severity_color(rec.severity)),
                rec.severity,
                reset,
                rec.header,
                rec.message
            ));
        }
    }

    if !result.fixes.is_empty() {
        let platforms: Vec<&str> = result.fixes.keys().map(|p| p.id()).collect();
        out.push_str(&format!("\n[~] Patches rendered for: {}\n", platforms.join(", ")));
    }
    out
}

pub fn render_csp(report: &CspReport) -> String {
    let mut out = format!("[*] CSP valid: {}\n", report.is_valid);
    for d in &report.directives {
        let flag = if d.is_unsafe { " [unsafe]" } else { "" };
        out.push_str(&format!("    {} {}{}\n", d.directive, d.sources.join(" "), flag));
    }
    for issue in &report.issues {
        out.push_str(&format!("[!] {}\n", issue));
    }
    out
}

pub fn render_hsts(cfg: &HstsConfig) -> String {
    format!(
        "[*] max-age: {}\n[*] includeSubDomains: {}\n[*] preload: {}\n[*] Preload eligible: {}\n",
        cfg.max_age, cfg.include_subdomains, cfg.preload, cfg.is_eligible
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{check_hsts_preload, validate_csp, Analyzer, HeaderMap};

    #[test]
    fn report_lists_buckets_without_color() {
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options".into(), "DENY".into());
        headers.insert("referrer-policy".into(), "unsafe-url".into());
        let result = Analyzer::new().analyze("https://a.test/", &headers);
        let text = render_report(&result, false);
        assert!(!text.contains('\x1b'));
        assert!(text.contains("[+] Found (1)\n    X-Frame-Options: DENY"));
        assert!(text.contains("[!] Misconfigured (1)\n    Referrer-Policy: unsafe-url"));
        assert!(text.contains("Cross-Origin-Opener-Policy (optional)"));
        assert!(text.contains("[CRITICAL] Content-Security-Policy"));
    }

    #[test]
    fn csp_and_hsts_render() {
        let csp = render_csp(&validate_csp("script-src *"));
        assert!(csp.contains("script-src * [unsafe]"));
        assert!(csp.contains("[!] Missing default-src"));
        assert!(render_hsts(&check_hsts_preload("max-age=3600")).contains("Preload eligible: false"));
    }
}
