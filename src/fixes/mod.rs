pub mod builder;
pub mod document;
pub mod generators;
pub mod platform;
pub mod pr;
pub mod validate;

pub use builder::{build_fixes, check_fix_parity, FixAction, SecurityFix};
pub use generators::{generate_for_configs, generate_for_platforms, generate_patch, generator_for, PatchGenerator};
pub use platform::{FrameworkConfig, Platform};
pub use pr::{build_pr_description, PullRequestDraft};
pub use validate::{validate_patch, PatchValidation};
