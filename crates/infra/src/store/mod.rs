//! Storage for grants, roles and assignments.

pub mod in_memory;

pub use in_memory::InMemoryRbacStore;
