use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One year, the minimum max-age accepted by the browser preload lists.
pub const PRELOAD_MIN_MAX_AGE: u64 = 31_536_000;

static MAX_AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)max-age=(\d+)").expect("max-age pattern must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HstsConfig {
    pub max_age: u64,
    pub include_subdomains: bool,
    pub preload: bool,
    pub is_eligible: bool,
}

/// Parses a Strict-Transport-Security value. Flag detection is a lenient
/// substring check so directive order and casing do not matter.
pub fn check_hsts_preload(header_value: &str) -> HstsConfig {
    let max_age = MAX_AGE_RE
        .captures(header_value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);

    let lower = header_value.to_ascii_lowercase();
    let include_subdomains = lower.contains("includesubdomains");
    let preload = lower.contains("preload");

    HstsConfig {
        max_age,
        include_subdomains,
        preload,
        is_eligible: max_age >= PRELOAD_MIN_MAX_AGE && include_subdomains && preload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_value_is_eligible() {
        let cfg = check_hsts_preload("max-age=31536000; includeSubDomains; preload");
        assert_eq!(cfg.max_age, 31_536_000);
        assert!(cfg.include_subdomains);
        assert!(cfg.preload);
        assert!(cfg.is_eligible);
    }

    #[test]
    fn short_max_age_is_not_eligible() {
        let cfg = check_hsts_preload("max-age=3600");
        assert_eq!(cfg.max_age, 3600);
        assert!(!cfg.is_eligible);
    }

    #[test]
    fn ordering_and_case_are_tolerated() {
        let cfg = check_hsts_preload("PRELOAD; includesubdomains; Max-Age=63072000");
        assert!(cfg.is_eligible);
    }

    #[test]
    fn garbage_defaults_to_zero() {
        assert_eq!(check_hsts_preload("").max_age, 0);
        assert_eq!(check_hsts_preload("max-age=abc").max_age, 0);
        assert_eq!(check_hsts_preload("max-age=99999999999999999999999").max_age, 0);
    }

    #[test]
    fn flags_without_long_max_age_are_ineligible() {
        let cfg = check_hsts_preload("max-age=31535999; includeSubDomains; preload");
        assert!(!cfg.is_eligible);
    }
}
