//! MessagePack codec helpers.
//!
//! Thin wrappers around `rmp-serde`. All request and reply payloads use
//! MessagePack.

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Encode a value to MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec(value).map_err(NetError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::Decode)
}

#[cfg(test)]
mod tests {
    use cstr_schema::NodeId;
    use cstr_space::{StatusCode, Variant};

    use super::*;
    use crate::messages::{NodeRef, Reply, WriteRequest};

    #[test]
    fn test_write_request_survives_transport() {
        let req = WriteRequest {
            node: NodeRef::Path("Valves/HC-2/MANUAL_OUTPUT".into()),
            value: Some(Variant::Double(42.5)),
            index_range: None,
        };
        let restored: WriteRequest = decode(&encode(&req).unwrap()).unwrap();
        assert_eq!(restored, req);

        let req = WriteRequest {
            node: NodeRef::Id(NodeId::numeric(1, 50_010)),
            value: None,
            index_range: Some("0:2".into()),
        };
        let restored: WriteRequest = decode(&encode(&req).unwrap()).unwrap();
        assert_eq!(restored, req);
    }

    #[test]
    fn test_error_reply_keeps_status() {
        let reply: Reply<()> = Reply::Err {
            status: StatusCode::BadOutOfRange,
            message: "value NaN is not finite".into(),
        };
        let restored: Reply<()> = decode(&encode(&reply).unwrap()).unwrap();
        assert_eq!(restored, reply);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result: Result<WriteRequest, _> = decode(&[0xFF, 0xFF]);
        assert!(matches!(result, Err(NetError::Decode(_))));
    }
}
