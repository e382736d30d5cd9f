//! CLI command implementations.

mod analyze;
mod folder;

pub use analyze::{render_report, run_analyze};
pub use folder::run_folder;
