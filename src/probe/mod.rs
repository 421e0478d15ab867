pub mod header_source;
pub mod target;
pub mod throttle;

pub use header_source::{analyze_url, collect_headers, HeaderSource, HttpHeaderSource};
pub use target::normalize_url;
pub use throttle::Throttle;
