//! URL-encoded search parameters
//!
//! The service takes each query's parameters as one `params` string. Array
//! values (`facets`, `facetFilters`, ...) travel as JSON inside that string.

use serde_json::Value;
use url::form_urlencoded;

use crate::query::QueryState;

/// Ordered parameter list of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SearchParams {
    pairs: Vec<(&'static str, String)>,
}

impl SearchParams {
    /// Parameters of `query` as-is, facet filters included
    pub(crate) fn from_query(query: &QueryState) -> Self {
        let mut params = Self::default();
        params.set("query", query.text().to_string());
        params.set("page", query.page().to_string());
        if let Some(hits_per_page) = query.hits_per_page() {
            params.set("hitsPerPage", hits_per_page.to_string());
        }
        if !query.facets().is_empty() {
            params.set_json("facets", &Value::from(query.facets().to_vec()));
        }
        if !query.facet_filters().is_empty() {
            params.set_json("facetFilters", &Value::from(query.facet_filters().to_vec()));
        }
        if !query.filters().is_empty() {
            params.set("filters", query.filters().to_string());
        }
        params
    }

    /// Set `key`, replacing any previous value in place
    pub(crate) fn set(&mut self, key: &'static str, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub(crate) fn set_json(&mut self, key: &'static str, value: &Value) {
        self.set(key, value.to_string());
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| *k != key);
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `application/x-www-form-urlencoded` rendering
    pub(crate) fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}
