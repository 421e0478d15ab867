use chrono::{TimeZone, Utc};
use header_hardener::analyze::{check_hsts_preload, validate_csp, Analyzer, HeaderMap};
use header_hardener::fixes::{FixAction, Platform};
use header_hardener::scoring::Grade;

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn hardened_without_csp() -> HeaderMap {
    headers(&[
        ("strict-transport-security", "max-age=63072000; includeSubDomains; preload"),
        ("x-frame-options", "SAMEORIGIN"),
        ("x-content-type-options", "nosniff"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("permissions-policy", "geolocation=()"),
        ("cross-origin-opener-policy", "same-origin"),
        ("cross-origin-embedder-policy", "require-corp"),
        ("cross-origin-resource-policy", "same-site"),
    ])
}

#[test]
fn missing_csp_yields_single_add_fix() {
    let result = Analyzer::new().analyze("https://shop.test/", &hardened_without_csp());

    assert_eq!(result.score, 75);
    assert_eq!(result.grade, Grade::B);
    assert_eq!(result.fix_set.len(), 1);
    assert_eq!(result.fix_set[0].header, "Content-Security-Policy");
    assert_eq!(result.fix_set[0].action, FixAction::Add);
    assert_eq!(result.headers.missing.len(), 1);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].priority, 100);
}

#[test]
fn unsafe_csp_gets_half_credit_and_an_update() {
    let mut map = hardened_without_csp();
    map.insert(
        "content-security-policy".into(),
        "default-src 'self'; script-src 'self' 'unsafe-inline'".into(),
    );
    let result = Analyzer::new().analyze("https://shop.test/", &map);

    // 100 - 25 / 2 = 87.5
    assert_eq!(result.score, 88);
    assert_eq!(result.grade, Grade::A);
    assert_eq!(result.headers.misconfigured.len(), 1);
    let csp = &result.headers.misconfigured[0];
    assert!(csp.recommendation.contains("(current value:"));
    assert_eq!(result.fix_set[0].action, FixAction::Update);
}

#[test]
fn header_lookup_ignores_case() {
    let upper = headers(&[("X-Frame-Options", "DENY")]);
    let lower = headers(&[("x-frame-options", "DENY")]);
    let analyzer = Analyzer::new();
    assert_eq!(
        analyzer.analyze("https://a.test/", &upper).score,
        analyzer.analyze("https://a.test/", &lower).score
    );
}

#[test]
fn analysis_is_pure_for_a_fixed_timestamp() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let analyzer = Analyzer::new();
    let a = analyzer.analyze_at("https://a.test/", &hardened_without_csp(), at);
    let b = analyzer.analyze_at("https://a.test/", &hardened_without_csp(), at);
    assert_eq!(a, b);
}

#[test]
fn rendered_platforms_follow_configuration() {
    let analyzer = Analyzer::new().with_platforms(vec![Platform::Vercel]);
    let result = analyzer.analyze("https://a.test/", &HeaderMap::new());
    assert_eq!(result.fixes.keys().collect::<Vec<_>>(), vec![&Platform::Vercel]);
    assert!(result.fixes[&Platform::Vercel].contains("\"source\": \"/(.*)\""));
}

#[test]
fn result_serializes_grade_and_platform_ids() {
    let result = Analyzer::new()
        .with_platforms(vec![Platform::Nginx])
        .analyze("https://a.test/", &HeaderMap::new());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["grade"], "F");
    assert!(json["fixes"]["nginx"].is_string());
}

#[test]
fn csp_wildcard_and_missing_default() {
    let report = validate_csp("script-src *");
    assert!(!report.is_valid);
    assert_eq!(report.issues.len(), 2);
    assert!(report.directive("script-src").unwrap().is_unsafe);
}

#[test]
fn hsts_preload_needs_all_three_parts() {
    assert!(check_hsts_preload("max-age=31536000; includeSubDomains; preload").is_eligible);
    assert!(!check_hsts_preload("max-age=31535999; includeSubDomains; preload").is_eligible);
    assert!(!check_hsts_preload("max-age=31536000; preload").is_eligible);
    assert!(!check_hsts_preload("includeSubDomains; preload").is_eligible);
}
