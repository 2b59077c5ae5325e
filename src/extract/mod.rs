//! Turns an evaluated result page into the three record types.
//!
//! Every selector and fixed offset these extractors rely on is tied to the
//! evaluator's current markup. Missing data is an error, never a default.

mod emag;
mod page_info;
mod summary;

pub use emag::get_emag_summary;
pub use page_info::get_page_info;
pub use summary::get_ases_summary;

use crate::document::Document;
use crate::model::{ErrorsWarningsEmag, ErrorsWarningsSummary, PageInfo};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub page_info: PageInfo,
    pub summary: ErrorsWarningsSummary,
    pub emag: Vec<ErrorsWarningsEmag>,
}

/// Runs all three extractors. Summary and eMAG records are keyed by the page url
/// the evaluator reported, which falls back to `target` for uploaded pages.
pub fn extract_all(doc: &Document, target: &str) -> Result<Extracted> {
    let page_info = get_page_info(doc, target)?;
    let summary = get_ases_summary(doc, &page_info.url)?;
    let emag = get_emag_summary(doc, &page_info.url)?;

    Ok(Extracted {
        page_info,
        summary,
        emag,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A result page in the evaluator's layout. `page_url` adds the "Página" pair.
    pub fn result_page(page_url: Option<&str>, emag_tables: &str) -> String {
        let page_pair = page_url
            .map(|u| format!("<p><strong>Página:</strong> {u}</p>"))
            .unwrap_or_default();
        let cells: String = (0..18).map(|i| format!("<td>{i}</td>")).collect();
        format!(
            r#"<html><body>
            <h2>Página Avaliada</h2>
            <div class="tile">
                {page_pair}
                <p><strong>Título:</strong> Example</p>
                <p><strong>Tamanho:</strong> 2000 Bytes</p>
            </div>
            <div id="webaxscore"><span> 87% </span></div>
            <table id="tabelaErros"><tbody><tr>{cells}</tr></tbody></table>
            {emag_tables}
            <pre><code>line one
line two
line three</code></pre>
            </body></html>"#
        )
    }
}
