//! Node identifiers.
//!
//! A [`NodeId`] is a `(namespace, numeric id)` pair. Namespace 0 holds the
//! well-known nodes (the `Objects` root folder), namespace 1 holds
//! everything the plant declares or instantiates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A namespaced numeric node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index.
    pub namespace: u16,
    /// Numeric identifier within the namespace.
    pub id: u32,
}

impl NodeId {
    /// The null node id sentinel.
    pub const NULL: NodeId = NodeId::numeric(0, 0);

    /// The root `Objects` folder every instance hierarchy hangs off.
    pub const OBJECTS_FOLDER: NodeId = NodeId::numeric(0, 85);

    /// Namespace used for plant-defined nodes.
    pub const PLANT_NAMESPACE: u16 = 1;

    /// Create a numeric node id.
    #[must_use]
    pub const fn numeric(namespace: u16, id: u32) -> Self {
        Self { namespace, id }
    }

    /// Returns `true` for the null sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.namespace == 0 && self.id == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};i={}", self.namespace, self.id)
    }
}

/// Error returned when a textual node id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node id '{0}', expected 'ns=<n>;i=<id>' or 'i=<id>'")]
pub struct ParseNodeIdError(pub String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    /// Parses `ns=1;i=50001` or the namespace-0 shorthand `i=85`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNodeIdError(s.to_string());
        let trimmed = s.trim();

        let (namespace, rest) = match trimmed.split_once(';') {
            Some((ns, rest)) => {
                let ns = ns.strip_prefix("ns=").ok_or_else(err)?;
                (ns.parse::<u16>().map_err(|_| err())?, rest)
            }
            None => (0, trimmed),
        };

        let id = rest
            .strip_prefix("i=")
            .ok_or_else(err)?
            .parse::<u32>()
            .map_err(|_| err())?;

        Ok(Self::numeric(namespace, id))
    }
}
