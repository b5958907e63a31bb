use crate::markdown::{escape_md_link, single_line};
use crate::paper::PaperRecord;
use crate::search::SearchFilters;

/// Numbered Markdown listing of a result set. Numbers are 1-based and match the
/// indices accepted by `--select`.
pub fn format_results(papers: &[PaperRecord], filters: &SearchFilters) -> String {
    let mut output = format!("# Papers: {}\n\n", single_line(filters.query.trim()));

    if papers.is_empty() {
        output.push_str(&format!(
            "No papers found between {} and {}.\n",
            filters.year_start, filters.year_end
        ));
        return output;
    }

    let selected = papers.iter().filter(|p| p.selected).count();
    output.push_str(&format!(
        "{} found ({}-{}), {} selected\n\n",
        papers.len(),
        filters.year_start,
        filters.year_end,
        selected
    ));

    for (i, paper) in papers.iter().enumerate() {
        let mark = if paper.selected { 'x' } else { ' ' };
        let link_label = if paper.is_pdf() { "PDF" } else { "Link" };
        output.push_str(&format!(
            "{}. [{mark}] **{}** ({})\n   {}; {}; {} citations\n   [{link_label}]({})\n",
            i + 1,
            single_line(&paper.title),
            paper.year,
            single_line(&paper.authors.join(", ")),
            single_line(&paper.publisher),
            paper.citations,
            escape_md_link(&paper.url),
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, url: &str, selected: bool) -> PaperRecord {
        PaperRecord {
            id: "id".into(),
            title: title.into(),
            authors: vec!["Ada".into(), "Grace".into()],
            year: 2022,
            citations: 7,
            publisher: "arXiv".into(),
            url: url.into(),
            selected,
        }
    }

    fn filters() -> SearchFilters {
        SearchFilters {
            query: "graph\nneural nets".into(),
            year_start: 2015,
            year_end: 2025,
            ..SearchFilters::default()
        }
    }

    #[test]
    fn lists_numbered_papers_with_selection() {
        let papers = [
            paper("A", "https://x.org/a.pdf", true),
            paper("B", "https://x.org/abs(1)", false),
        ];

        let text = format_results(&papers, &filters());

        assert!(text.starts_with("# Papers: graph neural nets\n"));
        assert!(text.contains("2 found (2015-2025), 1 selected"));
        assert!(text.contains("1. [x] **A** (2022)"));
        assert!(text.contains("Ada, Grace; arXiv; 7 citations"));
        assert!(text.contains("[PDF](https://x.org/a.pdf)"));
        assert!(text.contains("2. [ ] **B** (2022)"));
        assert!(text.contains(r"[Link](https://x.org/abs\(1\))"));
    }

    #[test]
    fn empty_results_mention_range() {
        let text = format_results(&[], &filters());
        assert!(text.contains("No papers found between 2015 and 2025."));
    }
}
