use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::platform::{FrameworkConfig, Platform};

/// Plain `Header: value` listing for platforms without a dedicated generator.
pub struct GenericGenerator;

impl PatchGenerator for GenericGenerator {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let mut out = format!(
            "# Security headers for {}\n# Configure your server to send these response headers.\n",
            existing.platform.display_name()
        );
        for fix in fixes {
            out.push_str(&format!("{}: {}\n", fix.header, fix.value));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::generators::test_support::sample_fixes;

    #[test]
    fn lists_one_line_per_fix() {
        let out = GenericGenerator.generate(&FrameworkConfig::new(Platform::Generic), &sample_fixes());
        let lines: Vec<&str> = out.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "X-Frame-Options: DENY");
    }
}
