//! JSON Report Library
//!
//! Turns a JSON dataset into a multi-page statistical PDF report, built with
//! Rust, Polars and Plotters.
//!
//! # Overview
//!
//! A report contains:
//!
//! - **Title page**: report title, generation time, source file and shape
//! - **Numeric columns**: histogram with a density curve and a boxplot
//! - **Correlations**: annotated Pearson heatmap when there are two or more
//!   numeric columns
//! - **Categorical columns**: bar chart of the ten most frequent values
//! - **Fallback**: a notice page when no column can be charted
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use json_report::{ReportConfig, generate_pdf_report};
//!
//! let config = ReportConfig::builder()
//!     .json_path("data/sample_data.json")
//!     .report_dir("reports")
//!     .title("Test Report")
//!     .build()?;
//!
//! let path = generate_pdf_report(&config)?;
//! println!("Report generated at: {}", path.display());
//! ```
//!
//! # Input Format
//!
//! The JSON document is either a list of flat objects, or an object whose
//! `"data"` key holds such a list:
//!
//! ```json
//! [{"value": 1, "category": "A"}, {"value": 2, "category": "B"}]
//! ```
//!
//! Columns are the union of record keys in first-seen order. Integer and
//! float columns are numeric; strings, booleans and mixed columns are
//! categorical; columns with no values are skipped.

pub mod config;
pub mod dataset;
pub mod error;
pub mod profiler;
pub mod render;
pub mod reporting;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder};
pub use dataset::{ColumnKind, Dataset, load_json_dataset};
pub use error::{ReportError, Result as ReportResult, ResultExt};
pub use profiler::{ColumnClassification, classify_columns};
pub use reporting::{
    PageRenderer, ReportGenerator, ReportOutcome, generate_pdf_report, plan_pages, run_from_cli,
};
pub use utils::{DtypeCategory, dtype_category_str, get_dtype_category, is_numeric_dtype};
