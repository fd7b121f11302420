//! Facet, numeric and boolean refinements
//!
//! The `RefinementStore` owns every refinement a user has applied and compiles
//! them into the filter expressions carried by `QueryState`. The expressions
//! are the only serialized artifact of this crate and follow a fixed grammar:
//!
//! - facets: `attribute:value`, one entry per active pair
//! - numeric: `attribute<op><value>` with the value rendered to six decimals
//! - boolean: `attribute:true` / `attribute:false`
//!
//! Numeric clauses come first, then boolean clauses, all joined with ` AND `.

mod numeric;
mod store;

pub use numeric::{NumericOperator, NumericRefinement};
pub use store::RefinementStore;
