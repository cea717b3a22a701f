//! Report generation: the HTML dashboard plus Markdown and JSON exports.

pub mod dashboard;
pub mod generator;

pub use dashboard::{render_dashboard, DashboardOptions};
pub use generator::{generate_json_report, generate_markdown_report};
