use std::collections::HashMap;

use crate::document::{create_selector, next_sibling_text, text, text_trimmed, Document};
use crate::model::PageInfo;
use crate::{Error, Result};

const INFO_LABELS: &str = "div.tile strong";
const SOURCE_CODE: &str = "code";

const KEY_PAGE: &str = "Página";
const KEY_TITLE: &str = "Título";
const KEY_SIZE: &str = "Tamanho";
const SIZE_SUFFIX: &str = "Bytes";

/// Reads the "label: value" pairs of the info panel.
///
/// Without a "Página" pair the evaluator worked on an uploaded file, so the
/// submitted `target` stands in for the page url.
pub fn get_page_info(doc: &Document, target: &str) -> Result<PageInfo> {
    let labels = create_selector(INFO_LABELS)?;
    let code = create_selector(SOURCE_CODE)?;

    let info: HashMap<String, String> = doc
        .select_all(&labels)
        .iter()
        .map(|el| {
            let key = strip_label_suffix(&text_trimmed(el)).to_string();
            (key, next_sibling_text(el).unwrap_or_default())
        })
        .collect();

    let num_lines_of_code = doc
        .select_first(&code)
        .map(|el| text(&el).split('\n').count())
        .ok_or(Error::MissingField(SOURCE_CODE))?;

    let name = info
        .get(KEY_TITLE)
        .ok_or(Error::MissingField(KEY_TITLE))?
        .clone();
    let size = info.get(KEY_SIZE).ok_or(Error::MissingField(KEY_SIZE))?;

    Ok(PageInfo {
        url: info.get(KEY_PAGE).cloned().unwrap_or_else(|| target.to_string()),
        name,
        size_bytes: parse_kilobytes(size)?,
        with_html: !info.contains_key(KEY_PAGE),
        num_lines_of_code,
    })
}

/// "Título:" -> "Título"
fn strip_label_suffix(label: &str) -> &str {
    label.strip_suffix(':').unwrap_or(label).trim_end()
}

/// "2000 Bytes" -> 2.0
fn parse_kilobytes(size: &str) -> Result<f64> {
    let bytes: f64 = size.trim_end_matches(SIZE_SUFFIX).trim().parse()?;
    Ok(bytes / 1_000.0)
}
