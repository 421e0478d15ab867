pub mod apache;
pub mod express;
pub mod generic;
pub mod netlify;
pub mod nextjs;
pub mod nginx;
pub mod vercel;

use std::collections::BTreeMap;

use super::builder::SecurityFix;
use super::platform::{FrameworkConfig, Platform};

/// Renders a Fix-Set into one platform's native config syntax.
/// Implementations are pure string rendering: no file or network access.
pub trait PatchGenerator: Send + Sync {
    fn platform(&self) -> Platform;

    /// Returns the full patched file content.
    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String;
}

static NGINX: nginx::NginxGenerator = nginx::NginxGenerator;
static APACHE: apache::ApacheGenerator = apache::ApacheGenerator;
static NEXTJS: nextjs::NextJsGenerator = nextjs::NextJsGenerator;
static EXPRESS: express::ExpressGenerator = express::ExpressGenerator;
static NETLIFY: netlify::NetlifyGenerator = netlify::NetlifyGenerator;
static VERCEL: vercel::VercelGenerator = vercel::VercelGenerator;
static GENERIC: generic::GenericGenerator = generic::GenericGenerator;

/// Never fails: platforms without a dedicated generator get the generic listing.
pub fn generator_for(platform: &Platform) -> &'static dyn PatchGenerator {
    match platform {
        Platform::Nginx => &NGINX,
        Platform::Apache => &APACHE,
        Platform::NextJs => &NEXTJS,
        Platform::Express => &EXPRESS,
        Platform::Netlify => &NETLIFY,
        Platform::Vercel => &VERCEL,
        Platform::Generic | Platform::Other(_) => &GENERIC,
    }
}

pub fn generate_patch(config: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
    generator_for(&config.platform).generate(config, fixes)
}

/// Renders fixes for each config, keyed by platform.
pub fn generate_for_configs(configs: &[FrameworkConfig], fixes: &[SecurityFix]) -> BTreeMap<Platform, String> {
    configs
        .iter()
        .map(|cfg| (cfg.platform.clone(), generate_patch(cfg, fixes)))
        .collect()
}

/// Renders fixes as fresh files for each platform.
pub fn generate_for_platforms(platforms: &[Platform], fixes: &[SecurityFix]) -> BTreeMap<Platform, String> {
    let configs: Vec<FrameworkConfig> = platforms.iter().cloned().map(FrameworkConfig::new).collect();
    generate_for_configs(&configs, fixes)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::analyze::rules::Severity;
    use crate::fixes::builder::{FixAction, SecurityFix};

    pub fn fix(header: &str, value: &str) -> SecurityFix {
        SecurityFix {
            header: header.to_string(),
            value: value.to_string(),
            description: format!("set {header}"),
            reference: None,
            action: FixAction::Add,
            severity: Severity::High,
        }
    }

    pub fn sample_fixes() -> Vec<SecurityFix> {
        vec![
            fix("Content-Security-Policy", "default-src 'self'; object-src 'none'"),
            fix("X-Frame-Options", "DENY"),
            fix("X-Content-Type-Options", "nosniff"),
        ]
    }
}
