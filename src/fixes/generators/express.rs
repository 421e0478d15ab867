use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::document::js_string;
use crate::fixes::platform::{FrameworkConfig, Platform};

/// Standalone Express middleware module. Existing content is not merged:
/// the module is always emitted complete and mounted with `app.use`.
pub struct ExpressGenerator;

impl PatchGenerator for ExpressGenerator {
    fn platform(&self) -> Platform {
        Platform::Express
    }

    fn generate(&self, _existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let mut out = String::from("// Security headers middleware\n// Usage: app.use(require('./security-headers'));\n\n");
        out.push_str("const SECURITY_HEADERS = [\n");
        for fix in fixes {
            out.push_str(&format!("  [{}, {}],\n", js_string(&fix.header), js_string(&fix.value)));
        }
        out.push_str("];\n\n");
        out.push_str("module.exports = function securityHeaders(req, res, next) {\n");
        out.push_str("  for (const [name, value] of SECURITY_HEADERS) {\n");
        out.push_str("    res.setHeader(name, value);\n");
        out.push_str("  }\n");
        out.push_str("  next();\n");
        out.push_str("};\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::generators::test_support::sample_fixes;

    #[test]
    fn renders_middleware() {
        let out = ExpressGenerator.generate(&FrameworkConfig::new(Platform::Express), &sample_fixes());
        assert!(out.contains("[\"X-Frame-Options\", \"DENY\"],"));
        assert!(out.contains("res.setHeader(name, value);"));
        assert!(out.contains("module.exports"));
    }
}
