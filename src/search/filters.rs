use chrono::{Datelike, Local};

pub const DEFAULT_YEAR_START: i32 = 2015;
pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const DEFAULT_DOWNLOAD_PATH: &str = "C:/Scholar_Papers";

/// What the user asked for. `min_citations` is carried but not applied to results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub query: String,
    pub year_start: i32,
    pub year_end: i32,
    pub min_citations: u32,
    pub max_results: u32,
    /// Passed through untouched to the generated download script.
    pub download_path: String,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            year_start: DEFAULT_YEAR_START,
            year_end: current_year(),
            min_citations: 0,
            max_results: DEFAULT_MAX_RESULTS,
            download_path: DEFAULT_DOWNLOAD_PATH.to_string(),
        }
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}
