//! Binding and access errors.

use cstr_schema::{NodeId, ScalarKind, TypeId};
use thiserror::Error;

use crate::status::StatusCode;

/// Errors raised while creating instances or binding their children.
///
/// These are setup-time programming or schema mismatches. A failure aborts
/// binding for the affected instance only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("parent node {0} not found or cannot hold instances")]
    NotFound(NodeId),
    #[error("unknown type: {0}")]
    UnknownType(TypeId),
    #[error("no child '{name}' under {parent}")]
    ChildNotFound { parent: NodeId, name: String },
    #[error("node {0} is not a variable")]
    NotAVariable(NodeId),
    #[error("node {node} holds {declared} values but the bound field is {bound}")]
    KindMismatch {
        node: NodeId,
        declared: ScalarKind,
        bound: ScalarKind,
    },
    #[error("node {0} already has a data source")]
    AlreadyBound(NodeId),
    #[error("instance {instance} is missing mandatory child '{child}'")]
    IncompleteInstance { instance: NodeId, child: String },
}

/// Errors returned synchronously to the remote caller of a read or write.
///
/// None of these are fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error("variable has no backing field")]
    InternalError,
    #[error("index ranges are not supported on scalar variables")]
    InvalidRange,
    #[error("no value supplied")]
    InvalidArgument,
    #[error("expected a scalar {expected}, got {found}")]
    TypeMismatch {
        expected: ScalarKind,
        found: &'static str,
    },
    #[error("value {0} is not finite")]
    OutOfRange(f64),
    #[error("node {0} does not exist")]
    NodeIdUnknown(NodeId),
    #[error("node {0} is not readable")]
    NotReadable(NodeId),
    #[error("node {0} is not writable")]
    NotWritable(NodeId),
}

impl AccessError {
    /// The status code reported on the wire.
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::InternalError => StatusCode::BadInternalError,
            AccessError::InvalidRange => StatusCode::BadIndexRangeInvalid,
            AccessError::InvalidArgument => StatusCode::BadInvalidArgument,
            AccessError::TypeMismatch { .. } => StatusCode::BadTypeMismatch,
            AccessError::OutOfRange(_) => StatusCode::BadOutOfRange,
            AccessError::NodeIdUnknown(_) => StatusCode::BadNodeIdUnknown,
            AccessError::NotReadable(_) => StatusCode::BadNotReadable,
            AccessError::NotWritable(_) => StatusCode::BadNotWritable,
        }
    }
}
