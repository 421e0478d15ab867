pub mod clean_reporter;
pub mod writer_csv;
pub mod writer_jsonl;

pub use clean_reporter::{render_csp, render_hsts, render_report};
pub use writer_csv::write_csv;
pub use writer_jsonl::{read_jsonl, write_jsonl};
