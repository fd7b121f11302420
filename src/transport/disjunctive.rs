//! Disjunctive faceting over the multi-query endpoint
//!
//! A disjunctive facet ORs its refined values together, and its counts must
//! ignore its own refinements (otherwise selecting one value would hide every
//! other one). One main query fetches the hits with all refinements applied;
//! one extra query per disjunctive facet fetches only that facet's counts with
//! every refinement except its own.

use indexmap::IndexMap;
use serde_json::Value;

use super::params::SearchParams;
use crate::query::QueryState;
use crate::results::{FacetCounts, ResultPayload};

/// `facetFilters` for `refinements`, skipping `exclude`
///
/// Conjunctive values are AND-ed as flat entries; the values of a disjunctive
/// facet form one nested OR array.
pub(crate) fn facet_filters(
    disjunctive_facets: &[String],
    refinements: &IndexMap<String, Vec<String>>,
    exclude: Option<&str>,
) -> Vec<Value> {
    let mut filters = Vec::new();
    for (attribute, values) in refinements {
        if values.is_empty() || exclude == Some(attribute.as_str()) {
            continue;
        }
        let entries = values.iter().map(|value| Value::String(format!("{attribute}:{value}")));
        if disjunctive_facets.iter().any(|facet| facet == attribute) {
            filters.push(Value::Array(entries.collect()));
        } else {
            filters.extend(entries);
        }
    }
    filters
}

/// Main query first, then one count-only query per disjunctive facet
pub(crate) fn build_queries(
    query: &QueryState,
    disjunctive_facets: &[String],
    refinements: &IndexMap<String, Vec<String>>,
) -> Vec<SearchParams> {
    let mut main = SearchParams::from_query(query);
    set_facet_filters(&mut main, facet_filters(disjunctive_facets, refinements, None));

    let mut queries = Vec::with_capacity(disjunctive_facets.len() + 1);
    queries.push(main);

    for facet in disjunctive_facets {
        let mut params = SearchParams::from_query(query);
        set_facet_filters(
            &mut params,
            facet_filters(disjunctive_facets, refinements, Some(facet)),
        );
        params.set("page", "0".to_string());
        params.set("hitsPerPage", "0".to_string());
        params.set_json("facets", &Value::from(vec![facet.clone()]));
        params.set_json("attributesToRetrieve", &Value::Array(Vec::new()));
        params.set_json("attributesToHighlight", &Value::Array(Vec::new()));
        params.set_json("attributesToSnippet", &Value::Array(Vec::new()));
        params.set("analytics", "false".to_string());
        queries.push(params);
    }
    queries
}

fn set_facet_filters(params: &mut SearchParams, filters: Vec<Value>) {
    if filters.is_empty() {
        params.remove("facetFilters");
    } else {
        params.set_json("facetFilters", &Value::Array(filters));
    }
}

/// Fold the per-facet answers into the main payload
///
/// `results` must be in `build_queries` order. Refined values missing from a
/// facet's counts are kept with a count of zero so they stay selectable.
pub(crate) fn merge(
    results: Vec<ResultPayload>,
    disjunctive_facets: &[String],
    refinements: &IndexMap<String, Vec<String>>,
) -> Option<ResultPayload> {
    let mut results = results.into_iter();
    let mut main = results.next()?;

    for (facet, result) in disjunctive_facets.iter().zip(results) {
        let mut counts: FacetCounts = result.facets.get(facet).cloned().unwrap_or_default();
        if let Some(values) = refinements.get(facet) {
            for value in values {
                counts.entry(value.clone()).or_insert(0);
            }
        }
        if let Some(stats) = result.facets_stats.get(facet) {
            main.facets_stats.insert(facet.clone(), stats.clone());
        }
        main.disjunctive_facets.insert(facet.clone(), counts);
    }
    Some(main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refinements() -> IndexMap<String, Vec<String>> {
        let mut map = IndexMap::new();
        map.insert("brand".to_string(), vec!["acme".to_string(), "zeta".to_string()]);
        map.insert("color".to_string(), vec!["red".to_string()]);
        map.insert("size".to_string(), Vec::new());
        map
    }

    #[test]
    fn test_disjunctive_values_are_grouped() {
        let disjunctive = vec!["brand".to_string()];
        let filters = facet_filters(&disjunctive, &refinements(), None);
        assert_eq!(
            Value::Array(filters),
            json!([["brand:acme", "brand:zeta"], "color:red"])
        );
    }

    #[test]
    fn test_facet_query_drops_own_refinements() {
        let disjunctive = vec!["brand".to_string()];
        let query = QueryState::new("shoe").with_page(4).with_hits_per_page(Some(20));
        let queries = build_queries(&query, &disjunctive, &refinements());
        assert_eq!(queries.len(), 2);

        let main = &queries[0];
        assert_eq!(main.get("page"), Some("4"));
        assert_eq!(
            main.get("facetFilters"),
            Some(r#"[["brand:acme","brand:zeta"],"color:red"]"#)
        );

        let brand = &queries[1];
        assert_eq!(brand.get("query"), Some("shoe"));
        assert_eq!(brand.get("page"), Some("0"));
        assert_eq!(brand.get("hitsPerPage"), Some("0"));
        assert_eq!(brand.get("facets"), Some(r#"["brand"]"#));
        assert_eq!(brand.get("facetFilters"), Some(r#"["color:red"]"#));
        assert_eq!(brand.get("analytics"), Some("false"));
    }

    #[test]
    fn test_facet_query_without_other_refinements_has_no_filters() {
        let disjunctive = vec!["color".to_string()];
        let mut only_color = IndexMap::new();
        only_color.insert("color".to_string(), vec!["red".to_string()]);
        let queries = build_queries(&QueryState::new(""), &disjunctive, &only_color);
        assert_eq!(queries[1].get("facetFilters"), None);
    }

    #[test]
    fn test_merge_keeps_refined_values_visible() {
        let disjunctive = vec!["brand".to_string()];
        let main = ResultPayload::from_json(json!({
            "hits": [{ "objectID": "1" }],
            "nbPages": 1,
            "facets": { "color": { "red": 1 } }
        }))
        .expect("main parses");
        let brand = ResultPayload::from_json(json!({
            "hits": [],
            "facets": { "brand": { "acme": 5, "other": 2 } },
            "facets_stats": { "brand": { "min": 1, "max": 1, "avg": 1, "sum": 1 } }
        }))
        .expect("facet result parses");

        let merged = merge(vec![main, brand], &disjunctive, &refinements()).expect("main result");
        let counts = &merged.disjunctive_facets["brand"];
        assert_eq!(counts.get("acme"), Some(&5));
        assert_eq!(counts.get("other"), Some(&2));
        assert_eq!(counts.get("zeta"), Some(&0));
        assert!(merged.facets_stats.contains_key("brand"));
        assert_eq!(merged.hits.len(), 1);
    }

    #[test]
    fn test_merge_without_results_is_none() {
        assert!(merge(Vec::new(), &[], &IndexMap::new()).is_none());
    }
}
