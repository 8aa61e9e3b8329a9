//! # cstr_net
//!
//! NATS transport for the plant data-access protocol.
//!
//! This crate provides:
//!
//! - [`subjects`]: request subjects under a configurable prefix.
//! - [`messages`]: request and reply payloads.
//! - [`codec`]: MessagePack serialisation/deserialisation helpers.
//! - [`connection`]: NATS connection management and request/reply.
//! - [`error`]: Network-layer error types.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;

pub use codec::{decode, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use messages::{BrowseRequest, NodeRef, ReadRequest, Reply, SchemaRequest, WriteRequest};
