//! Request sequencing
//!
//! Every outbound request gets a number from a shared `SequenceSource`. The
//! `RequestSequencer` tracks requests in flight by that number and decides,
//! when one completes, whether its response may be displayed:
//!
//! 1. The completed request leaves the pending table.
//! 2. Every still-pending request with a smaller number is cancelled, because
//!    responses do not arrive in request order and a newer answer proves the
//!    older ones obsolete.
//! 3. A response not newer than the last displayed one is ignored.
//! 4. Otherwise it becomes the last displayed response.
//!
//! Observers therefore see results in non-decreasing sequence order and never
//! see a result older than one already displayed.

mod counter;
mod pending;
mod request_sequencer;

pub use counter::{SequenceNumber, SequenceSource};
pub use pending::{PendingRequest, RequestKind};
pub use request_sequencer::{Completion, Decision, IgnoreReason, RequestSequencer};
