//! Paper search: prompt construction, dispatch to the model, and result-set state.

pub(crate) mod dispatch;
pub(crate) mod filters;
pub(crate) mod prompt;
pub(crate) mod report;
pub(crate) mod session;

pub use filters::SearchFilters;
pub use session::SearchSession;
