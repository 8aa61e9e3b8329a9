//! # cstr_schema
//!
//! Declarative object types for the reactor plant address space.
//!
//! This crate provides:
//!
//! - [`NodeId`]: namespaced numeric node identifiers.
//! - [`ScalarKind`] and [`AccessLevel`]: the primitive kinds and access
//!   modes a declared child variable may carry.
//! - [`SchemaRegistry`]: the set of registered object types, each with a
//!   fixed, ordered list of mandatory children.
//! - [`plant`]: the four object types the reactor plant exposes.

pub mod kind;
pub mod node;
pub mod plant;
pub mod registry;

pub use kind::{AccessLevel, ScalarKind};
pub use node::{NodeId, ParseNodeIdError};
pub use plant::PlantTypes;
pub use registry::{FieldDef, ObjectType, SchemaError, SchemaRegistry, TypeId};
