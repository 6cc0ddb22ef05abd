//! Output formatting module
//!
//! Handles result reporting in several forms:
//! - Console results block (`text`)
//! - Plain-text summary file (`summary`)
//! - JSON report (`json`)

pub mod json;
pub mod summary;
pub mod text;

pub use json::{write_json_report, JsonReport};
pub use summary::{save_summary, write_summary};
pub use text::print_results;
