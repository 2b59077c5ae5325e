/// A row that can be written to one of the CSV sinks.
/// `fields` must line up with `HEADERS`.
pub trait Record {
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub url: String,
    pub name: String,
    /// Despite the name this is in kilobytes, the evaluator reports bytes.
    pub size_bytes: f64,
    /// The evaluation ran on an uploaded copy of the page instead of the live url.
    pub with_html: bool,
    pub num_lines_of_code: usize,
}

impl Record for PageInfo {
    const HEADERS: &'static [&'static str] =
        &["url", "name", "size_bytes", "with_html", "num_lines_of_code"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            self.name.clone(),
            self.size_bytes.to_string(),
            self.with_html.to_string(),
            self.num_lines_of_code.to_string(),
        ]
    }
}

/// Error and warning counts per category, in the order the evaluator lists them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub markup: u32,
    pub behavior: u32,
    pub information: u32,
    pub presentation: u32,
    pub multimedia: u32,
    pub form: u32,
}

impl CategoryCounts {
    fn as_array(&self) -> [u32; 6] {
        [
            self.markup,
            self.behavior,
            self.information,
            self.presentation,
            self.multimedia,
            self.form,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsWarningsSummary {
    pub url: String,
    /// ASES score as a ratio in `0.0..=1.0`.
    pub ases_pct: f64,
    pub errors: CategoryCounts,
    pub warnings: CategoryCounts,
}

impl Record for ErrorsWarningsSummary {
    const HEADERS: &'static [&'static str] = &[
        "url",
        "ases_pct",
        "n_markup_errors",
        "n_behavior_errors",
        "n_information_errors",
        "n_presentation_errors",
        "n_multimedia_errors",
        "n_form_errors",
        "n_markup_warnings",
        "n_behavior_warnings",
        "n_information_warnings",
        "n_presentation_warnings",
        "n_multimedia_warnings",
        "n_form_warnings",
    ];

    fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(Self::HEADERS.len());
        fields.push(self.url.clone());
        fields.push(self.ases_pct.to_string());
        fields.extend(self.errors.as_array().iter().map(u32::to_string));
        fields.extend(self.warnings.as_array().iter().map(u32::to_string));
        fields
    }
}

/// One recommendation row of an eMAG detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsWarningsEmag {
    pub url: String,
    /// `error` or `warning`.
    pub category: String,
    pub info_type: String,
    pub recommendation: String,
    pub quantity: u32,
    pub source_code_lines: Vec<String>,
}

impl Record for ErrorsWarningsEmag {
    const HEADERS: &'static [&'static str] = &[
        "url",
        "category",
        "info_type",
        "recommendation",
        "quantity",
        "source_code_lines",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            self.category.clone(),
            self.info_type.clone(),
            self.recommendation.clone(),
            self.quantity.to_string(),
            self.source_code_lines.join(","),
        ]
    }
}
