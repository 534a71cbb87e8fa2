//! Azure Provider Core
//!
//! Core library shared by the Azure provider crates: the resource model,
//! attribute schemas, the provider trait and the state upgrade framework
//! that rewrites persisted state when a resource's schema version moves on.

pub mod provider;
pub mod resource;
pub mod schema;
pub mod upgrade;
