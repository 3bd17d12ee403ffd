//! Per-entity save protocols and the aggregate load/merge engine.
//!
//! Every protocol follows the same three-phase shape: plan the remote calls from the aggregate's sync statuses, emit
//! the pre-call events and run the sibling calls concurrently, then fold the responses back into the aggregate one at
//! a time. Successful siblings are always folded, even when another sibling failed; the first failure is returned
//! once folding is done. Nothing is ever folded before its call succeeded.

pub mod address;
pub mod customer;
pub mod load;
pub mod payment_method;
pub mod subscription;
pub mod transaction;
