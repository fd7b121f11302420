//! Refinement and query mutators
//!
//! Every mutator recompiles the derived filter expressions into a fresh query
//! snapshot and puts it back on page 0. None of them starts a search.

use crate::errors::SearcherResult;
use crate::query::QueryState;
use crate::refinement::{NumericOperator, NumericRefinement, RefinementStore};

use super::core::Searcher;

impl Searcher {
    fn update_refinements<R>(&self, update: impl FnOnce(&mut RefinementStore) -> R) -> R {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let result = update(&mut state.refinements);
        state.query = state.refinements.apply_to(&state.query);
        result
    }

    /// Use `query`'s parameters for following searches
    ///
    /// Derived filters are recomputed from the current refinements.
    pub fn set_query(&self, query: QueryState) -> &Self {
        let mut state = self.inner.state.lock();
        state.query = state.refinements.apply_to(&query);
        self
    }

    // Facets

    /// Register `attribute` with initial refined `values`, optionally as disjunctive
    pub fn add_facet(&self, attribute: &str, disjunctive: bool, values: Vec<String>) -> &Self {
        self.update_refinements(|store| store.add_facet(attribute, disjunctive, values));
        self
    }

    pub fn add_facet_refinement(&self, attribute: &str, value: &str) -> &Self {
        self.update_refinements(|store| store.add_facet_refinement(attribute, value));
        self
    }

    pub fn remove_facet_refinement(&self, attribute: &str, value: &str) -> &Self {
        self.update_refinements(|store| store.remove_facet_refinement(attribute, value));
        self
    }

    /// Add or remove the pair according to `active`
    pub fn update_facet_refinement(&self, attribute: &str, value: &str, active: bool) -> &Self {
        self.update_refinements(|store| store.update_facet_refinement(attribute, value, active));
        self
    }

    /// Flip the pair; returns whether it is refined afterwards
    pub fn toggle_facet_refinement(&self, attribute: &str, value: &str) -> bool {
        self.update_refinements(|store| store.toggle_facet_refinement(attribute, value))
    }

    #[must_use]
    pub fn has_facet_refinement(&self, attribute: &str, value: &str) -> bool {
        self.inner
            .state
            .lock()
            .refinements
            .has_facet_refinement(attribute, value)
    }

    /// Clear every facet refinement and every disjunctive marking
    pub fn clear_facet_refinements(&self) -> &Self {
        self.update_refinements(RefinementStore::clear_facet_refinements);
        self
    }

    /// Clear the refinements of `attribute` and its disjunctive marking
    pub fn clear_facet_refinements_for(&self, attribute: &str) -> &Self {
        self.update_refinements(|store| store.clear_facet_refinements_for(attribute));
        self
    }

    /// Request counts for `attributes`, keeping the existing order and skipping duplicates
    pub fn add_facets(&self, attributes: &[&str]) -> &Self {
        let mut state = self.inner.state.lock();
        let mut facets = state.query.facets().to_vec();
        for attribute in attributes {
            if !facets.iter().any(|facet| facet == attribute) {
                facets.push((*attribute).to_string());
            }
        }
        state.query = state.query.clone().with_facets(facets);
        self
    }

    pub fn remove_facets(&self, attributes: &[&str]) -> &Self {
        let mut state = self.inner.state.lock();
        let facets = state
            .query
            .facets()
            .iter()
            .filter(|facet| !attributes.contains(&facet.as_str()))
            .cloned()
            .collect();
        state.query = state.query.clone().with_facets(facets);
        self
    }

    // Numeric refinements

    /// Insert or replace the refinement for its (attribute, operator) pair
    pub fn add_numeric_refinement(&self, refinement: NumericRefinement) -> &Self {
        self.update_refinements(|store| store.add_numeric_refinement(refinement));
        self
    }

    #[must_use]
    pub fn numeric_refinement(
        &self,
        attribute: &str,
        operator: NumericOperator,
    ) -> Option<NumericRefinement> {
        self.inner
            .state
            .lock()
            .refinements
            .numeric_refinement(attribute, operator)
            .cloned()
    }

    /// Look up a refinement by raw operator code
    ///
    /// # Errors
    /// `InvalidArgument` when `code` is not a known operator.
    pub fn numeric_refinement_by_code(
        &self,
        attribute: &str,
        code: i32,
    ) -> SearcherResult<Option<NumericRefinement>> {
        let operator = NumericOperator::try_from(code)?;
        Ok(self.numeric_refinement(attribute, operator))
    }

    /// Remove every numeric refinement on `attribute`
    pub fn remove_numeric_refinements(&self, attribute: &str) -> &Self {
        self.update_refinements(|store| store.remove_numeric_refinements(attribute));
        self
    }

    pub fn remove_numeric_refinement(&self, attribute: &str, operator: NumericOperator) -> &Self {
        self.update_refinements(|store| store.remove_numeric_refinement(attribute, operator));
        self
    }

    /// # Errors
    /// `InvalidArgument` when `code` is not a known operator; nothing is removed.
    pub fn remove_numeric_refinement_by_code(&self, attribute: &str, code: i32) -> SearcherResult<&Self> {
        let operator = NumericOperator::try_from(code)?;
        Ok(self.remove_numeric_refinement(attribute, operator))
    }

    // Boolean filters

    pub fn add_boolean_filter(&self, attribute: &str, value: bool) -> &Self {
        self.update_refinements(|store| store.add_boolean_filter(attribute, value));
        self
    }

    #[must_use]
    pub fn boolean_filter(&self, attribute: &str) -> Option<bool> {
        self.inner.state.lock().refinements.boolean_filter(attribute)
    }

    pub fn remove_boolean_filter(&self, attribute: &str) -> &Self {
        self.update_refinements(|store| store.remove_boolean_filter(attribute));
        self
    }

    /// Attributes currently searched disjunctively, in registration order
    #[must_use]
    pub fn disjunctive_facets(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .refinements
            .disjunctive_facets()
            .to_vec()
    }
}
