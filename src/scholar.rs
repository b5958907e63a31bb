use url::Url;

const SCHOLAR_SEARCH: &str = "https://scholar.google.com/scholar";

/// Google Scholar search URL for manually checking a query over a year range.
pub fn scholar_url(query: &str, year_start: i32, year_end: i32) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        SCHOLAR_SEARCH,
        [
            ("q", query.trim().to_string()),
            ("as_ylo", year_start.to_string()),
            ("as_yhi", year_end.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_query_and_year_range() {
        let url = scholar_url(" severe case warning & ICU ", 2015, 2025).unwrap();

        assert_eq!(url.host_str(), Some("scholar.google.com"));
        assert_eq!(url.path(), "/scholar");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("q".to_string(), "severe case warning & ICU".to_string()),
                ("as_ylo".to_string(), "2015".to_string()),
                ("as_yhi".to_string(), "2025".to_string()),
            ]
        );
        assert!(!url.as_str().contains(' '));
    }
}
