use crate::document::{create_selector, text_trimmed, Document};
use crate::model::{CategoryCounts, ErrorsWarningsSummary};
use crate::{Error, Result};

const SCORE: &str = "div#webaxscore span";
const SUMMARY_CELLS: &str = "table#tabelaErros tbody td";

/// The summary table is six rows of (category, errors, warnings).
const SUMMARY_CELL_COUNT: usize = 18;
/// Cell offsets for markup, behavior, information, presentation, multimedia, form.
const ERROR_CELLS: [usize; 6] = [1, 4, 7, 10, 13, 16];
const WARNING_CELLS: [usize; 6] = [2, 5, 8, 11, 14, 17];

pub fn get_ases_summary(doc: &Document, url: &str) -> Result<ErrorsWarningsSummary> {
    let score = create_selector(SCORE)?;
    let cells = create_selector(SUMMARY_CELLS)?;

    let ases_pct = doc
        .select_first(&score)
        .map(|el| text_trimmed(&el))
        .ok_or(Error::MissingField(SCORE))?;

    let summary: Vec<String> = doc
        .select_all(&cells)
        .iter()
        .map(text_trimmed)
        .collect();
    if summary.len() != SUMMARY_CELL_COUNT {
        return Err(Error::MalformedTable {
            table: SUMMARY_CELLS.into(),
            expected: SUMMARY_CELL_COUNT,
            found: summary.len(),
        });
    }

    Ok(ErrorsWarningsSummary {
        url: url.to_string(),
        ases_pct: parse_ratio(&ases_pct)?,
        errors: counts_at(&summary, ERROR_CELLS)?,
        warnings: counts_at(&summary, WARNING_CELLS)?,
    })
}

/// "87%" -> 0.87
fn parse_ratio(pct: &str) -> Result<f64> {
    let pct: f64 = pct.trim_end_matches('%').trim().parse()?;
    Ok(pct / 100.0)
}

fn counts_at(cells: &[String], offsets: [usize; 6]) -> Result<CategoryCounts> {
    let [markup, behavior, information, presentation, multimedia, form] =
        offsets.map(|i| cells[i].parse::<u32>());

    Ok(CategoryCounts {
        markup: markup?,
        behavior: behavior?,
        information: information?,
        presentation: presentation?,
        multimedia: multimedia?,
        form: form?,
    })
}
