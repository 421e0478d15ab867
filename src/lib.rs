pub mod analyze;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod fixes;
pub mod http_client;
pub mod output;
pub mod probe;
pub mod publish;
pub mod scoring;
pub mod utils;

// re-export the caller-facing API
pub use crate::analyze::{check_hsts_preload, validate_csp, AnalysisResult, Analyzer, HeaderMap};
pub use crate::fixes::{FrameworkConfig, Platform, SecurityFix};
pub use crate::probe::{analyze_url, HeaderSource};
