//! Report assembly.
//!
//! This module turns a [`ReportConfig`](crate::ReportConfig) into a PDF file:
//! it loads and classifies the dataset, plans the pages and drives the page
//! renderers in order.
//!
//! # Example
//!
//! ```rust,ignore
//! use json_report::{ReportConfig, ReportGenerator};
//!
//! let config = ReportConfig::builder()
//!     .json_path("data/sales.json")
//!     .report_dir("reports")
//!     .title("Sales Overview")
//!     .build()?;
//!
//! let outcome = ReportGenerator::generate(&config)?;
//! println!("{} pages written to {}", outcome.pages.len(), outcome.report_path.display());
//! ```

mod generator;

pub use generator::{
    PageRenderer, REPORT_FILE_PREFIX, ReportGenerator, ReportOutcome, generate_pdf_report,
    plan_pages, report_file_name, run_from_cli,
};
