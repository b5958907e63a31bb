//! Prompt sent to the grounded model for a paper search.

/// Template placeholders: {query}, {year_start}, {year_end}, {max_results}
const PAPER_SEARCH_TEMPLATE: &str = r#"TASK: You are a Research Paper Link Extractor.
OBJECTIVE: Search for and list directly downloadable academic papers for the topic: "{query}".

SEARCH CONSTRAINTS:
- Date Range: {year_start} to {year_end}. Only include papers published in this range.
- Target Format: PDF files preferred (use 'filetype:pdf').
- Sources: Google Scholar, PubMed, arXiv, ResearchGate, University Repositories.
- Quantity: Find as many DISTINCT papers as possible, up to {max_results} high quality matches.

SEARCH QUERIES TO EXECUTE INTERNALLY:
1. "{query}" filetype:pdf {year_start}..{year_end}
2. "{query}" site:nih.gov {year_start}..{year_end}
3. "{query}" site:arxiv.org {year_start}..{year_end}

OUTPUT REQUIREMENTS:
- Return a raw JSON array.
- DO NOT generate fake papers. Only return papers found in the search grounding.
- For the URL: Prioritize the direct PDF link. If not found, use the landing page.
- Citations: Estimate if not strictly visible, or set to 0.

JSON STRUCTURE:
[
  {
    "title": "Paper Title",
    "authors": ["Author Name"],
    "year": 2023,
    "citations": 12,
    "publisher": "Source/Journal",
    "url": "https://example.com/paper.pdf"
  }
]"#;

pub fn build_paper_search_prompt(
    query: &str,
    year_start: i32,
    year_end: i32,
    max_results: u32,
) -> String {
    PAPER_SEARCH_TEMPLATE
        .replace("{year_start}", &year_start.to_string())
        .replace("{year_end}", &year_end.to_string())
        .replace("{max_results}", &max_results.to_string())
        // Last, so braces in user text are left alone.
        .replace("{query}", query.trim())
}
