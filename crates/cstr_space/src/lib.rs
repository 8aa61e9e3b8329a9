//! # cstr_space
//!
//! The remotely addressable view of the plant.
//!
//! This crate provides:
//!
//! - [`AddressSpace`]: node storage (folders, typed object instances and
//!   their mandatory child variables) with single-level browse resolution.
//! - [`binder`]: instance creation from a registered type and one-shot
//!   binding of child variables to fields of the backing state.
//! - [`adapter`]: the typed field data source (`f64` and `u32`) that
//!   validates remote reads and writes before touching the field.
//! - [`value`]: wire values: [`Variant`], [`DataValue`], [`NumericRange`].
//! - [`status`]: status codes returned to remote callers.
//! - [`error`]: binding and access errors.
//!
//! The address space is generic over the backing state `S`. Data sources
//! never hold a pointer into `S`; they hold a pair of accessor functions and
//! receive the state on every call. The caller owns the state and is
//! responsible for serializing all access to it.

pub mod adapter;
pub mod binder;
pub mod error;
pub mod space;
pub mod status;
pub mod value;

pub use adapter::{DataSource, FieldAccessor, FieldAdapter, NodeLabel, Scalar};
pub use error::{AccessError, BindingError};
pub use space::{AddressSpace, Node, NodeClass, ReferenceDescription, ReferenceKind};
pub use status::StatusCode;
pub use value::{DataValue, NumericRange, ParseRangeError, RangeDimension, ReadOptions, Variant, WriteValue};
