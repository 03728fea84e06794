//! `rulegate-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model and the addressing scheme for
//! protected resources.

pub mod error;
pub mod id;
pub mod ownership;
pub mod resource;

pub use error::{DomainError, DomainResult};
pub use id::{GrantId, RuleId};
pub use ownership::{Owned, ResourceOwnership};
pub use resource::{AddressingScheme, ResourceAddress, ResourceFamily};
