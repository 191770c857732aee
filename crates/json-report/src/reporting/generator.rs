use crate::config::{DEFAULT_REPORT_DIR, ReportConfig};
use crate::dataset::{Dataset, load_json_dataset};
use crate::error::{Result, ResultExt};
use crate::profiler::statistics::{TOP_CATEGORY_LIMIT, correlation_matrix, top_categories};
use crate::profiler::{ColumnClassification, classify_columns};
use crate::render::pages::{
    TitleSummary, draw_categorical_page, draw_correlation_page, draw_fallback_page,
    draw_numeric_page, draw_title_page,
};
use crate::render::{PageSize, ReportDocument};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of every report file name.
pub const REPORT_FILE_PREFIX: &str = "report_";

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Page plan
// ============================================================================

/// One page of the report, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", content = "columns", rename_all = "snake_case")]
pub enum PageRenderer {
    /// Title and dataset overview.
    Title,
    /// Histogram and boxplot of one numeric column.
    NumericColumn(String),
    /// Heatmap over all numeric columns.
    Correlation(Vec<String>),
    /// Top values of one categorical column.
    CategoricalColumn(String),
    /// Notice that nothing could be charted.
    Fallback,
}

impl fmt::Display for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "Title page"),
            Self::NumericColumn(column) => write!(f, "Numeric distribution for '{column}'"),
            Self::Correlation(columns) => {
                write!(f, "Correlation heatmap ({} columns)", columns.len())
            }
            Self::CategoricalColumn(column) => write!(f, "Top categories for '{column}'"),
            Self::Fallback => write!(f, "Fallback notice"),
        }
    }
}

/// Ordered page plan for a classification.
///
/// Title first; then one page per numeric column followed by the
/// correlation heatmap when there are at least two of them; then one page
/// per categorical column. With neither kind of column the plan is the
/// title and the fallback notice.
pub fn plan_pages(classification: &ColumnClassification) -> Vec<PageRenderer> {
    let mut plan = vec![PageRenderer::Title];

    plan.extend(
        classification
            .numeric
            .iter()
            .cloned()
            .map(PageRenderer::NumericColumn),
    );
    if classification.numeric.len() >= 2 {
        plan.push(PageRenderer::Correlation(classification.numeric.clone()));
    }

    plan.extend(
        classification
            .categorical
            .iter()
            .cloned()
            .map(PageRenderer::CategoricalColumn),
    );

    if classification.is_empty() {
        plan.push(PageRenderer::Fallback);
    }
    plan
}

/// File name of a report generated at `timestamp`.
pub fn report_file_name(timestamp: &NaiveDateTime) -> String {
    format!(
        "{REPORT_FILE_PREFIX}{}.pdf",
        timestamp.format(FILE_TIMESTAMP_FORMAT)
    )
}

// ============================================================================
// Outcome
// ============================================================================

/// Summary of a generated report, suitable for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// Path of the written PDF.
    pub report_path: PathBuf,
    /// Title printed on the first page.
    pub title: String,
    /// Local generation time, `YYYY-MM-DD HH:MM:SS`.
    pub generated_at: String,
    /// Number of dataset rows.
    pub rows: usize,
    /// Number of dataset columns.
    pub columns: usize,
    /// Column partition the plan was built from.
    pub classification: ColumnClassification,
    /// Pages actually written, in order.
    pub pages: Vec<PageRenderer>,
}

// ============================================================================
// Generator
// ============================================================================

/// Builds a PDF report from a JSON dataset.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate the report described by `config`.
    ///
    /// The steps run in a fixed order: load the dataset, create the report
    /// directory, name the file from the current local time, open the file,
    /// then render every planned page and write the document. A failure in
    /// any step aborts the call; a file opened before the failure is left
    /// behind empty.
    pub fn generate(config: &ReportConfig) -> Result<ReportOutcome> {
        config.validate()?;

        let dataset = load_json_dataset(&config.json_path)?;

        fs::create_dir_all(&config.report_dir).context(format!(
            "Creating report directory {}",
            config.report_dir.display()
        ))?;

        let generated = Local::now().naive_local();
        let report_path = config.report_dir.join(report_file_name(&generated));
        info!("Writing report to: {}", report_path.display());

        let mut document = ReportDocument::create(&report_path)?;

        let classification = classify_columns(&dataset);
        debug!(
            "Numeric columns: {:?}; categorical columns: {:?}",
            classification.numeric, classification.categorical
        );

        let title = config.resolved_title();
        let generated_at = generated.format(DISPLAY_TIMESTAMP_FORMAT).to_string();
        let source_file = config.source_file_name();
        let summary = TitleSummary {
            title: &title,
            generated_at: &generated_at,
            source_file: &source_file,
            rows: dataset.height(),
            columns: dataset.width(),
        };

        let mut pages = Vec::new();
        for page in plan_pages(&classification) {
            if render_page(&mut document, &dataset, &page, &summary)? {
                pages.push(page);
            }
        }

        let report_path = document.finish()?;
        info!(
            "Report generated with {} pages: {}",
            pages.len(),
            report_path.display()
        );

        Ok(ReportOutcome {
            report_path,
            title,
            generated_at,
            rows: dataset.height(),
            columns: dataset.width(),
            classification,
            pages,
        })
    }
}

/// Render one planned page; returns whether a page was added.
fn render_page(
    document: &mut ReportDocument,
    dataset: &Dataset,
    page: &PageRenderer,
    summary: &TitleSummary<'_>,
) -> Result<bool> {
    match page {
        PageRenderer::Title => {
            document.add_page(PageSize::A4_PORTRAIT, |area| draw_title_page(area, summary))?;
        }
        PageRenderer::NumericColumn(column) => {
            let values = dataset.numeric_values(column)?;
            if values.is_empty() {
                warn!("Numeric column '{}' has no values, skipping", column);
                return Ok(false);
            }
            debug!("Rendering numeric page for '{}' ({} values)", column, values.len());
            document
                .add_page(PageSize::A4_LANDSCAPE, |area| {
                    draw_numeric_page(area, column, &values)
                })
                .context(format!("Rendering numeric page for '{column}'"))?;
        }
        PageRenderer::Correlation(columns) => {
            if columns.len() < 2 {
                return Ok(false);
            }
            let series = columns
                .iter()
                .map(|column| Ok((column.clone(), dataset.optional_numeric_values(column)?)))
                .collect::<Result<Vec<_>>>()?;
            let matrix = correlation_matrix(&series);
            debug!("Rendering correlation heatmap for {} columns", columns.len());
            document
                .add_page(PageSize::WIDE, |area| draw_correlation_page(area, &matrix))
                .context("Rendering correlation heatmap")?;
        }
        PageRenderer::CategoricalColumn(column) => {
            let values = dataset.text_values(column)?;
            if values.is_empty() {
                warn!("Categorical column '{}' has no values, skipping", column);
                return Ok(false);
            }
            let categories = top_categories(&values, TOP_CATEGORY_LIMIT);
            debug!(
                "Rendering categorical page for '{}' ({} distinct shown)",
                column,
                categories.len()
            );
            document
                .add_page(PageSize::A4_LANDSCAPE, |area| {
                    draw_categorical_page(area, column, &categories)
                })
                .context(format!("Rendering categorical page for '{column}'"))?;
        }
        PageRenderer::Fallback => {
            info!("No columns to chart, adding fallback page");
            document.add_page(PageSize::A4_PORTRAIT, draw_fallback_page)?;
        }
    }
    Ok(true)
}

// ============================================================================
// Convenience entry points
// ============================================================================

/// Generate a report and return the path of the PDF.
pub fn generate_pdf_report(config: &ReportConfig) -> Result<PathBuf> {
    ReportGenerator::generate(config).map(|outcome| outcome.report_path)
}

/// Generate a report from loose arguments, defaulting the report directory
/// to `Reports`.
pub fn run_from_cli(
    json_path: impl AsRef<Path>,
    report_dir: Option<&Path>,
    title: Option<&str>,
) -> Result<PathBuf> {
    let config = ReportConfig::builder()
        .json_path(json_path.as_ref())
        .report_dir(report_dir.unwrap_or(Path::new(DEFAULT_REPORT_DIR)))
        .maybe_title(title.map(str::to_string))
        .build()?;
    generate_pdf_report(&config)
}
