//! Request and reply payloads.
//!
//! Every request travels as MessagePack on its operation subject and is
//! answered with a [`Reply`]. A per-request correlation id is carried in
//! NATS headers, not in the payload.

use std::fmt;

use cstr_schema::NodeId;
use cstr_space::{AccessError, StatusCode, Variant};
use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// How a request names its target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRef {
    Id(NodeId),
    /// Slash-separated browse path from the `Objects` folder.
    Path(String),
}

impl NodeRef {
    /// Parse operator input: `ns=1;i=50003` or `i=85` is an id, anything
    /// else is a browse path.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.parse::<NodeId>() {
            Ok(id) => NodeRef::Id(id),
            Err(_) => NodeRef::Path(text.to_string()),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{id}"),
            NodeRef::Path(path) => f.write_str(path),
        }
    }
}

/// Read one variable. Published on `<prefix>.read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub node: NodeRef,
    /// Index range in textual form (`"1"`, `"0:3"`).
    pub index_range: Option<String>,
    pub include_source_timestamp: bool,
}

/// Write one variable. Published on `<prefix>.write`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub node: NodeRef,
    pub value: Option<Variant>,
    pub index_range: Option<String>,
}

/// List the children of a node; `None` browses the `Objects` folder.
/// Published on `<prefix>.browse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseRequest {
    pub node: Option<NodeRef>,
}

/// Ask for the registered object types as JSON. Published on
/// `<prefix>.schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRequest {}

/// Answer to any request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply<T> {
    Ok(T),
    Err { status: StatusCode, message: String },
}

impl<T> Reply<T> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Reply::Err {
            status,
            message: message.into(),
        }
    }

    /// Turn a failure reply into [`NetError::Remote`].
    pub fn into_result(self) -> Result<T, NetError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Err { status, message } => Err(NetError::Remote { status, message }),
        }
    }
}

impl<T> From<Result<T, AccessError>> for Reply<T> {
    fn from(result: Result<T, AccessError>) -> Self {
        match result {
            Ok(value) => Reply::Ok(value),
            Err(e) => Reply::error(e.status(), e.to_string()),
        }
    }
}

/// NATS header keys.
pub mod headers {
    /// Correlation id of a request, echoed on its reply.
    pub const REQUEST_ID: &str = "request-id";
}
