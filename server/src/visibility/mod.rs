//! Visibility Policy Evaluator
//!
//! Decides, without touching storage, whether a requester may see, edit or
//! moderate a submission or profile page.

pub mod policy;

pub use policy::{can_edit_field, can_moderate, evaluate, Access, Field, Governed};
