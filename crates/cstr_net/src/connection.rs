//! NATS connection management.
//!
//! A thin wrapper around `async-nats` with MessagePack request/reply.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::codec::{decode, encode};
use crate::error::NetError;
use crate::messages::{Reply, headers};

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// A wrapper around an `async-nats` client.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    client: async_nats::Client,
}

impl NatsConnection {
    /// Connect to NATS at the specified URL.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect_to(url: &str) -> Result<Self, NetError> {
        info!(url, "connecting to NATS");
        let client = async_nats::connect(url).await?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Subscribe to a subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber, NetError> {
        let sub = self.client.subscribe(subject.to_string()).await?;
        Ok(sub)
    }

    /// Publish an encoded reply, echoing the request id.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Publish`] if publishing fails.
    pub async fn reply(
        &self,
        subject: async_nats::Subject,
        request_id: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<(), NetError> {
        let mut map = async_nats::HeaderMap::new();
        if let Some(id) = request_id {
            map.insert(headers::REQUEST_ID, id);
        }
        self.client
            .publish_with_headers(subject, map, payload.into())
            .await?;
        Ok(())
    }

    /// Send a request and wait for its [`Reply`].
    ///
    /// A failure reply from the server becomes [`NetError::Remote`].
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] on encoding, transport, timeout, decoding, or a
    /// failure reply.
    pub async fn request<Req, Resp>(
        &self,
        subject: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp, NetError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = encode(request)?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut map = async_nats::HeaderMap::new();
        map.insert(headers::REQUEST_ID, request_id.as_str());
        debug!(subject, %request_id, "sending request");

        let message = tokio::time::timeout(
            timeout,
            self.client
                .request_with_headers(subject.to_string(), map, payload.into()),
        )
        .await
        .map_err(|_| NetError::Timeout(timeout))??;

        let reply: Reply<Resp> = decode(&message.payload)?;
        reply.into_result()
    }

    /// Flush buffered messages to the server.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Flush`] if the flush fails.
    pub async fn flush(&self) -> Result<(), NetError> {
        self.client.flush().await?;
        Ok(())
    }
}
