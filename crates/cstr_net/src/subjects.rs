//! NATS subject hierarchy.
//!
//! Every request subject lives under a configurable prefix, `cstr` by
//! default:
//!
//! - `<prefix>.read`: read one variable
//! - `<prefix>.write`: write one variable
//! - `<prefix>.browse`: list the children of a node
//! - `<prefix>.schema`: describe the registered object types

/// Default subject prefix.
pub const DEFAULT_PREFIX: &str = "cstr";

pub const READ: &str = "read";
pub const WRITE: &str = "write";
pub const BROWSE: &str = "browse";
pub const SCHEMA: &str = "schema";

fn subject(prefix: &str, operation: &str) -> String {
    format!("{prefix}.{operation}")
}

/// `<prefix>.read`
#[must_use]
pub fn read(prefix: &str) -> String {
    subject(prefix, READ)
}

/// `<prefix>.write`
#[must_use]
pub fn write(prefix: &str) -> String {
    subject(prefix, WRITE)
}

/// `<prefix>.browse`
#[must_use]
pub fn browse(prefix: &str) -> String {
    subject(prefix, BROWSE)
}

/// `<prefix>.schema`
#[must_use]
pub fn schema(prefix: &str) -> String {
    subject(prefix, SCHEMA)
}

/// Wildcard covering every request subject: `<prefix>.>`
#[must_use]
pub fn all(prefix: &str) -> String {
    format!("{prefix}.>")
}

/// Strip the prefix from a received subject, leaving the operation name.
#[must_use]
pub fn operation<'a>(prefix: &str, subject: &'a str) -> Option<&'a str> {
    subject
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
}
