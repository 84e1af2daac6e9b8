//! Identity & Role Resolution
//!
//! Every request is resolved to a [`Requester`]: either anonymous or a
//! principal with exactly one [`Role`] and its project memberships. The
//! resolved value is passed explicitly into every operation.

pub mod assign;
pub mod handlers;
pub mod resolver;
pub mod role;
pub mod types;

pub use assign::change_role;
pub use resolver::resolve;
pub use role::Role;
pub use types::*;
