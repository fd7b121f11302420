//! Refinement bookkeeping and filter compilation

use indexmap::IndexMap;
use std::collections::BTreeMap;

use super::numeric::{NumericOperator, NumericRefinement};
use crate::query::QueryState;

/// Holds every refinement applied to a search session
///
/// Attribute order is first-insertion order and value order within an
/// attribute is insertion order, so compiled expressions are deterministic.
#[derive(Debug, Clone, Default)]
pub struct RefinementStore {
    facet_refinements: IndexMap<String, Vec<String>>,
    disjunctive_facets: Vec<String>,
    numeric_refinements: IndexMap<String, BTreeMap<NumericOperator, NumericRefinement>>,
    boolean_filters: IndexMap<String, bool>,
}

impl RefinementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Facet refinements
    // ------------------------------------------------------------------

    /// Register a facet, optionally as disjunctive, with its initial values
    ///
    /// Replaces any values already refined for `attribute`.
    pub fn add_facet(&mut self, attribute: &str, disjunctive: bool, values: Vec<String>) {
        if disjunctive && !self.is_disjunctive(attribute) {
            self.disjunctive_facets.push(attribute.to_string());
        }
        let mut deduped: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        self.facet_refinements.insert(attribute.to_string(), deduped);
    }

    /// Returns `true` if the pair was not refined before
    pub fn add_facet_refinement(&mut self, attribute: &str, value: &str) -> bool {
        let values = self
            .facet_refinements
            .entry(attribute.to_string())
            .or_default();
        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.to_string());
        true
    }

    /// Returns `true` if the pair was refined before
    pub fn remove_facet_refinement(&mut self, attribute: &str, value: &str) -> bool {
        let Some(values) = self.facet_refinements.get_mut(attribute) else {
            return false;
        };
        match values.iter().position(|v| v == value) {
            Some(index) => {
                values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flip the pair and return whether it is refined afterwards
    pub fn toggle_facet_refinement(&mut self, attribute: &str, value: &str) -> bool {
        if self.has_facet_refinement(attribute, value) {
            self.remove_facet_refinement(attribute, value);
            false
        } else {
            self.add_facet_refinement(attribute, value);
            true
        }
    }

    pub fn update_facet_refinement(&mut self, attribute: &str, value: &str, active: bool) {
        if active {
            self.add_facet_refinement(attribute, value);
        } else {
            self.remove_facet_refinement(attribute, value);
        }
    }

    #[must_use]
    pub fn has_facet_refinement(&self, attribute: &str, value: &str) -> bool {
        self.facet_refinements
            .get(attribute)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Drop every facet refinement and every disjunctive marking
    pub fn clear_facet_refinements(&mut self) {
        self.facet_refinements.clear();
        self.disjunctive_facets.clear();
    }

    /// Drop the refinements of one attribute and its disjunctive marking
    pub fn clear_facet_refinements_for(&mut self, attribute: &str) {
        if let Some(values) = self.facet_refinements.get_mut(attribute) {
            values.clear();
        }
        self.disjunctive_facets.retain(|facet| facet != attribute);
    }

    #[must_use]
    pub fn is_disjunctive(&self, attribute: &str) -> bool {
        self.disjunctive_facets.iter().any(|facet| facet == attribute)
    }

    /// Attributes registered as disjunctive, in registration order
    #[must_use]
    pub fn disjunctive_facets(&self) -> &[String] {
        &self.disjunctive_facets
    }

    /// Refined values per attribute, as passed to disjunctive requests
    #[must_use]
    pub fn refinement_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.facet_refinements
    }

    // ------------------------------------------------------------------
    // Numeric refinements
    // ------------------------------------------------------------------

    /// Insert or replace the refinement for its (attribute, operator) key
    pub fn add_numeric_refinement(&mut self, refinement: NumericRefinement) {
        self.numeric_refinements
            .entry(refinement.attribute.clone())
            .or_default()
            .insert(refinement.operator, refinement);
    }

    #[must_use]
    pub fn numeric_refinement(
        &self,
        attribute: &str,
        operator: NumericOperator,
    ) -> Option<&NumericRefinement> {
        self.numeric_refinements
            .get(attribute)
            .and_then(|by_operator| by_operator.get(&operator))
    }

    /// Remove every numeric refinement on `attribute`
    pub fn remove_numeric_refinements(&mut self, attribute: &str) -> bool {
        self.numeric_refinements.shift_remove(attribute).is_some()
    }

    pub fn remove_numeric_refinement(&mut self, attribute: &str, operator: NumericOperator) -> bool {
        let Some(by_operator) = self.numeric_refinements.get_mut(attribute) else {
            return false;
        };
        let removed = by_operator.remove(&operator).is_some();
        if by_operator.is_empty() {
            self.numeric_refinements.shift_remove(attribute);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Boolean filters
    // ------------------------------------------------------------------

    pub fn add_boolean_filter(&mut self, attribute: &str, value: bool) {
        self.boolean_filters.insert(attribute.to_string(), value);
    }

    #[must_use]
    pub fn boolean_filter(&self, attribute: &str) -> Option<bool> {
        self.boolean_filters.get(attribute).copied()
    }

    pub fn remove_boolean_filter(&mut self, attribute: &str) -> bool {
        self.boolean_filters.shift_remove(attribute).is_some()
    }

    /// Drop facet, numeric and boolean refinements alike
    pub fn clear_all(&mut self) {
        self.clear_facet_refinements();
        self.numeric_refinements.clear();
        self.boolean_filters.clear();
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Facet filter expression: one `attribute:value` entry per active pair
    #[must_use]
    pub fn compile_facet_filters(&self) -> Vec<String> {
        self.facet_refinements
            .iter()
            .flat_map(|(attribute, values)| {
                values.iter().map(move |value| format!("{attribute}:{value}"))
            })
            .collect()
    }

    /// Numeric clauses then boolean clauses, joined with ` AND `
    #[must_use]
    pub fn compile_filters(&self) -> String {
        let numeric = self
            .numeric_refinements
            .values()
            .flat_map(BTreeMap::values)
            .map(ToString::to_string);
        let boolean = self
            .boolean_filters
            .iter()
            .map(|(attribute, value)| format!("{attribute}:{value}"));
        numeric.chain(boolean).collect::<Vec<_>>().join(" AND ")
    }

    /// New query snapshot carrying the compiled expressions, back on page 0
    #[must_use]
    pub fn apply_to(&self, query: &QueryState) -> QueryState {
        query
            .clone()
            .with_facet_filters(self.compile_facet_filters())
            .with_filters(self.compile_filters())
            .with_page(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_round_trip_restores_expression() {
        let mut store = RefinementStore::new();
        store.add_facet_refinement("brand", "acme");
        let before = store.compile_facet_filters();

        assert!(store.add_facet_refinement("color", "red"));
        assert_eq!(store.compile_facet_filters(), vec!["brand:acme", "color:red"]);

        assert!(store.remove_facet_refinement("color", "red"));
        assert_eq!(store.compile_facet_filters(), before);
    }

    #[test]
    fn test_facet_refinements_are_a_set() {
        let mut store = RefinementStore::new();
        assert!(store.add_facet_refinement("attribute", "foo"));
        assert!(!store.add_facet_refinement("attribute", "foo"));
        assert_eq!(store.compile_facet_filters(), vec!["attribute:foo"]);

        assert!(store.remove_facet_refinement("attribute", "foo"));
        assert!(!store.remove_facet_refinement("attribute", "foo"));
        assert!(store.compile_facet_filters().is_empty());
    }

    #[test]
    fn test_facet_order_is_attribute_then_insertion() {
        let mut store = RefinementStore::new();
        store.add_facet_refinement("color", "red");
        store.add_facet_refinement("brand", "acme");
        store.add_facet_refinement("color", "blue");
        assert_eq!(
            store.compile_facet_filters(),
            vec!["color:red", "color:blue", "brand:acme"]
        );
    }

    #[test]
    fn test_toggle_and_update() {
        let mut store = RefinementStore::new();
        assert!(store.toggle_facet_refinement("attribute", "foo"));
        assert!(store.has_facet_refinement("attribute", "foo"));
        assert!(!store.toggle_facet_refinement("attribute", "foo"));
        assert!(!store.has_facet_refinement("attribute", "foo"));

        store.update_facet_refinement("attribute", "foo", true);
        assert_eq!(store.compile_facet_filters(), vec!["attribute:foo"]);
        store.update_facet_refinement("attribute", "foo", false);
        assert!(store.compile_facet_filters().is_empty());
    }

    #[test]
    fn test_clear_for_attribute_keeps_others_and_unmarks_disjunctive() {
        let mut store = RefinementStore::new();
        store.add_facet("attribute", true, vec!["foo".to_string()]);
        store.add_facet_refinement("other", "baz");
        assert!(store.is_disjunctive("attribute"));

        store.clear_facet_refinements_for("attribute");
        assert_eq!(store.compile_facet_filters(), vec!["other:baz"]);
        assert!(!store.is_disjunctive("attribute"));
        assert!(store.disjunctive_facets().is_empty());
    }

    #[test]
    fn test_add_facet_dedups_initial_values() {
        let mut store = RefinementStore::new();
        store.add_facet(
            "size",
            true,
            vec!["M".to_string(), "L".to_string(), "M".to_string()],
        );
        store.add_facet("size", true, vec!["S".to_string()]);
        assert_eq!(store.disjunctive_facets(), ["size".to_string()]);
        assert_eq!(store.compile_facet_filters(), vec!["size:S"]);
    }

    #[test]
    fn test_numeric_single_refinement() {
        let mut store = RefinementStore::new();
        store.add_numeric_refinement(NumericRefinement::new("x", NumericOperator::Eq, 42.0));
        assert_eq!(store.compile_filters(), "x=42.000000");

        assert!(store.remove_numeric_refinement("x", NumericOperator::Eq));
        assert_eq!(store.compile_filters(), "");
        assert!(store.numeric_refinement("x", NumericOperator::Eq).is_none());
    }

    #[test]
    fn test_numeric_one_per_operator() {
        let mut store = RefinementStore::new();
        store.add_numeric_refinement(NumericRefinement::new("price", NumericOperator::Ge, 10.0));
        store.add_numeric_refinement(NumericRefinement::new("price", NumericOperator::Ge, 20.0));
        store.add_numeric_refinement(NumericRefinement::new("price", NumericOperator::Lt, 50.0));
        assert_eq!(
            store.compile_filters(),
            "price<50.000000 AND price>=20.000000"
        );
    }

    #[test]
    fn test_numeric_remove_by_attribute_or_operator() {
        let mut store = RefinementStore::new();
        let eq = NumericRefinement::new("attribute", NumericOperator::Eq, 42.0);
        let ne = NumericRefinement::new("attribute", NumericOperator::Ne, 42.0);

        store.add_numeric_refinement(eq.clone());
        store.add_numeric_refinement(ne.clone());
        assert_eq!(
            store.compile_filters(),
            "attribute=42.000000 AND attribute!=42.000000"
        );

        assert!(store.remove_numeric_refinements("attribute"));
        assert!(store.numeric_refinement("attribute", NumericOperator::Eq).is_none());
        assert_eq!(store.compile_filters(), "");

        store.add_numeric_refinement(eq);
        store.add_numeric_refinement(ne.clone());
        store.remove_numeric_refinement("attribute", NumericOperator::Eq);
        assert!(store.numeric_refinement("attribute", NumericOperator::Eq).is_none());
        assert_eq!(
            store.numeric_refinement("attribute", NumericOperator::Ne),
            Some(&ne)
        );
    }

    #[test]
    fn test_removing_unknown_numeric_is_noop() {
        let mut store = RefinementStore::new();
        assert!(!store.remove_numeric_refinement("missing", NumericOperator::Gt));
        assert!(!store.remove_numeric_refinements("missing"));
    }

    #[test]
    fn test_numeric_before_boolean() {
        let mut store = RefinementStore::new();
        store.add_boolean_filter("in_stock", true);
        store.add_numeric_refinement(NumericRefinement::new("price", NumericOperator::Le, 99.0));
        store.add_boolean_filter("on_sale", false);
        assert_eq!(
            store.compile_filters(),
            "price<=99.000000 AND in_stock:true AND on_sale:false"
        );

        store.add_boolean_filter("in_stock", false);
        assert_eq!(store.boolean_filter("in_stock"), Some(false));
        assert!(store.remove_boolean_filter("in_stock"));
        assert_eq!(store.boolean_filter("in_stock"), None);
        assert_eq!(store.compile_filters(), "price<=99.000000 AND on_sale:false");
    }

    #[test]
    fn test_apply_resets_page_and_is_idempotent() {
        let mut store = RefinementStore::new();
        store.add_facet_refinement("brand", "acme");
        store.add_boolean_filter("in_stock", true);

        let query = QueryState::new("phone").with_page(4);
        let first = store.apply_to(&query);
        let second = store.apply_to(&first);

        assert_eq!(first.page(), 0);
        assert_eq!(first.facet_filters(), ["brand:acme".to_string()]);
        assert_eq!(first.filters(), "in_stock:true");
        assert_eq!(first, second);
        assert_eq!(query.page(), 4);
    }

    #[test]
    fn test_clear_all() {
        let mut store = RefinementStore::new();
        store.add_facet("color", true, vec!["red".to_string()]);
        store.add_numeric_refinement(NumericRefinement::new("price", NumericOperator::Gt, 1.0));
        store.add_boolean_filter("in_stock", true);

        store.clear_all();
        assert!(store.compile_facet_filters().is_empty());
        assert!(store.compile_filters().is_empty());
        assert!(store.disjunctive_facets().is_empty());
    }
}
