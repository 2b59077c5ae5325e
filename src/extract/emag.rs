use crate::document::{create_selector, text_trimmed, Document};
use crate::model::ErrorsWarningsEmag;
use crate::{Error, Result};

const EMAG_TABLES: &str = r#"table[class*="error_"], table[class*="warning_"]"#;
const CELLS: &str = "td";
const CATEGORIES: [&str; 2] = ["error", "warning"];

/// Cells per recommendation row: label, quantity, source lines.
const ROW_WIDTH: usize = 3;
/// Recommendation codes are fixed width, e.g. "1.1".
const RECOMMENDATION_LEN: usize = 3;

/// Collects every recommendation row of every eMAG table, in document order.
pub fn get_emag_summary(doc: &Document, url: &str) -> Result<Vec<ErrorsWarningsEmag>> {
    let tables = create_selector(EMAG_TABLES)?;
    let cells = create_selector(CELLS)?;

    let mut emag_summary = Vec::new();
    for table in doc.select_all(&tables) {
        let Some((category, info_type)) = table.value().classes().find_map(split_class) else {
            continue;
        };

        let data: Vec<String> = table.select(&cells).map(|td| text_trimmed(&td)).collect();
        if data.is_empty() {
            continue;
        }
        if data.len() % ROW_WIDTH != 0 {
            return Err(Error::MalformedTable {
                table: format!("{category}_{info_type}"),
                expected: data.len().next_multiple_of(ROW_WIDTH),
                found: data.len(),
            });
        }

        for row in data.chunks_exact(ROW_WIDTH) {
            emag_summary.push(ErrorsWarningsEmag {
                url: url.to_string(),
                category: category.to_string(),
                info_type: info_type.to_string(),
                recommendation: recommendation_code(&row[0]),
                quantity: row[1].parse()?,
                source_code_lines: row[2].split(',').map(|l| l.trim().to_string()).collect(),
            });
        }
    }

    Ok(emag_summary)
}

/// "error_behavior" -> ("error", "behavior")
fn split_class(class: &str) -> Option<(&str, &str)> {
    let (category, info_type) = class.split_once('_')?;
    CATEGORIES
        .contains(&category)
        .then_some((category, info_type))
}

fn recommendation_code(label: &str) -> String {
    label.chars().take(RECOMMENDATION_LEN).collect()
}
