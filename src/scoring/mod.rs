pub mod score;

pub use score::{grade, score, Grade};
