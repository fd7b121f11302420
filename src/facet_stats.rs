//! Per-facet statistics derived from a result payload
//!
//! Numeric attributes use the statistics computed by the service. Boolean
//! attributes (every facet value is the literal `true` or `false`) are scored
//! over `{0, 1}`, weighted by each value's hit count. Anything else carries no
//! statistic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::results::{FacetCounts, ResultPayload};

/// min/max/avg/sum of one faceted attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacetStat {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub sum: f64,
}

impl FacetStat {
    #[must_use]
    pub fn new(min: f64, max: f64, avg: f64, sum: f64) -> Self {
        Self { min, max, avg, sum }
    }

    /// Read a server-supplied `{min, max, avg, sum}` object; `None` unless all four are numbers
    #[must_use]
    pub fn from_server_stats(stats: &Value) -> Option<Self> {
        let field = |name: &str| stats.get(name).and_then(Value::as_f64);
        Some(Self {
            min: field("min")?,
            max: field("max")?,
            avg: field("avg")?,
            sum: field("sum")?,
        })
    }

    /// Score a facet whose values are all `true`/`false`
    #[must_use]
    pub fn from_boolean_counts(counts: &FacetCounts) -> Option<Self> {
        if counts.is_empty() {
            return None;
        }

        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut sum = 0.0;
        let mut total: u64 = 0;
        for (value, count) in counts {
            let score = match value.as_str() {
                "true" => 1.0,
                "false" => 0.0,
                _ => return None,
            };
            min = min.min(score);
            max = max.max(score);
            sum += score * *count as f64;
            total += count;
        }

        let avg = if total == 0 { 0.0 } else { sum / total as f64 };
        Some(Self { min, max, avg, sum })
    }
}

/// Compute the statistic of every faceted attribute that has one
///
/// Pure: callers replace each attribute's previous entry with the returned one.
#[must_use]
pub fn compute_facet_stats(payload: &ResultPayload) -> IndexMap<String, FacetStat> {
    payload
        .facets
        .iter()
        .filter_map(|(attribute, counts)| {
            let stat = payload
                .facets_stats
                .get(attribute)
                .and_then(FacetStat::from_server_stats)
                .or_else(|| FacetStat::from_boolean_counts(counts))?;
            Some((attribute.clone(), stat))
        })
        .collect()
}
