use tracing::{info, warn};

use crate::gemini::{CompletionClient, GeminiError};
use crate::normalize::normalize;
use crate::paper::PaperRecord;
use crate::search::dispatch::dispatch;
use crate::search::filters::SearchFilters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Completed,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("search failed: {0}")]
    Transport(#[from] GeminiError),
}

/// Owns the current result set and its selection state.
///
/// `search` takes `&mut self`, so a session cannot start a second search while one
/// is outstanding.
#[derive(Debug, Default)]
pub struct SearchSession {
    status: SearchStatus,
    papers: Vec<PaperRecord>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub fn selected(&self) -> impl Iterator<Item = &PaperRecord> {
        self.papers.iter().filter(|p| p.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    /// Replaces the result set with the outcome of a new search. On failure the
    /// result set stays empty.
    pub async fn search(
        &mut self,
        client: &impl CompletionClient,
        filters: &SearchFilters,
    ) -> Result<&[PaperRecord], SearchError> {
        if filters.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        self.clear();
        self.status = SearchStatus::Searching;

        let raw = match dispatch(client, filters).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "paper search failed");
                self.status = SearchStatus::Failed;
                return Err(e.into());
            }
        };

        self.papers = normalize(&raw, filters.year_start, filters.year_end);
        self.status = SearchStatus::Completed;
        info!(results = self.papers.len(), "search complete");
        Ok(&self.papers)
    }

    /// Flips the selection of the paper with `id`. Returns false if no such paper.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.papers.iter_mut().find(|p| p.id == id) {
            Some(paper) => {
                paper.selected = !paper.selected;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.set_all(true);
    }

    pub fn deselect_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, selected: bool) {
        for paper in &mut self.papers {
            paper.selected = selected;
        }
    }

    pub fn clear(&mut self) {
        self.papers.clear();
        self.status = SearchStatus::Idle;
    }
}
