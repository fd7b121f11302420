//! Search parameters consumed by every request
//!
//! `QueryState` is a value type: operations that rebuild filters produce a new
//! snapshot instead of mutating one shared by reference, so a request that
//! already captured its query never observes later edits.

mod state;

pub use state::QueryState;
