//! The `QueryState` value type

use serde::{Deserialize, Serialize};

/// Mutable search parameters, owned by a `Searcher`
///
/// The derived fields (`facet_filters`, `filters`) are only ever written by the
/// refinement store; callers read them through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    #[serde(rename = "query")]
    text: String,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    hits_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    facets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    facet_filters: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    filters: String,
}

impl QueryState {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn hits_per_page(&self) -> Option<u32> {
        self.hits_per_page
    }

    /// Facets requested from the service, in request order
    #[must_use]
    pub fn facets(&self) -> &[String] {
        &self.facets
    }

    /// Compiled facet refinements, one `attribute:value` entry per active pair
    #[must_use]
    pub fn facet_filters(&self) -> &[String] {
        &self.facet_filters
    }

    /// Compiled numeric and boolean filters joined with ` AND `
    #[must_use]
    pub fn filters(&self) -> &str {
        &self.filters
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_hits_per_page(mut self, hits_per_page: Option<u32>) -> Self {
        self.hits_per_page = hits_per_page;
        self
    }

    #[must_use]
    pub fn with_facets(mut self, facets: Vec<String>) -> Self {
        self.facets = facets;
        self
    }

    #[must_use]
    pub(crate) fn with_facet_filters(mut self, facet_filters: Vec<String>) -> Self {
        self.facet_filters = facet_filters;
        self
    }

    #[must_use]
    pub(crate) fn with_filters(mut self, filters: String) -> Self {
        self.filters = filters;
        self
    }
}
