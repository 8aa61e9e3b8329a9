//! NATS request handling and the server event loop.
//!
//! Subjects (all under the configured prefix, default `cstr`):
//!
//! - `{prefix}.read`: read one variable
//! - `{prefix}.write`: write one variable
//! - `{prefix}.browse`: list the children of a node
//! - `{prefix}.schema`: registered object types as JSON
//!
//! One task owns the plant and multiplexes requests, simulation ticks and
//! the interrupt signal, so every mutation of the model is serialized.

use cstr_net::messages::{BrowseRequest, NodeRef, ReadRequest, Reply, WriteRequest, headers};
use cstr_net::{NatsConnection, NetError, decode, encode, subjects};
use cstr_schema::NodeId;
use cstr_space::{DataValue, NumericRange, ReadOptions, ReferenceDescription, StatusCode, WriteValue};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::setup::Plant;
use crate::tick::TickLoop;

fn decode_request<'a, T: Deserialize<'a>, R>(payload: &'a [u8]) -> Result<T, Reply<R>> {
    decode(payload).map_err(|e| Reply::error(StatusCode::BadDecodingError, format!("invalid request: {e}")))
}

fn parse_range<R>(range: Option<&str>) -> Result<Option<NumericRange>, Reply<R>> {
    range
        .map(str::parse::<NumericRange>)
        .transpose()
        .map_err(|e| Reply::error(StatusCode::BadIndexRangeInvalid, e.to_string()))
}

impl Plant {
    fn resolve<R>(&self, node: &NodeRef) -> Result<NodeId, Reply<R>> {
        match node {
            NodeRef::Id(id) => Ok(*id),
            NodeRef::Path(path) => self.space.resolve_path(path).ok_or_else(|| {
                Reply::error(StatusCode::BadNotFound, format!("no node at path '{path}'"))
            }),
        }
    }

    /// Handle one request and encode its reply.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the reply cannot be encoded.
    pub fn handle(&mut self, operation: &str, payload: &[u8]) -> Result<Vec<u8>, NetError> {
        debug!(operation, "received request");
        match operation {
            subjects::READ => encode(&self.handle_read(payload)),
            subjects::WRITE => encode(&self.handle_write(payload)),
            subjects::BROWSE => encode(&self.handle_browse(payload)),
            subjects::SCHEMA => encode(&self.handle_schema()),
            other => {
                warn!(operation = other, "unknown operation");
                encode(&Reply::<()>::error(
                    StatusCode::BadServiceUnsupported,
                    format!("unknown operation: {other}"),
                ))
            }
        }
    }

    fn handle_read(&self, payload: &[u8]) -> Reply<DataValue> {
        let req: ReadRequest = match decode_request(payload) {
            Ok(req) => req,
            Err(reply) => return reply,
        };
        let node = match self.resolve(&req.node) {
            Ok(node) => node,
            Err(reply) => return reply,
        };
        let index_range = match parse_range(req.index_range.as_deref()) {
            Ok(range) => range,
            Err(reply) => return reply,
        };
        let options = ReadOptions {
            index_range,
            include_source_timestamp: req.include_source_timestamp,
        };
        self.space.read(node, &options, &self.model).into()
    }

    fn handle_write(&mut self, payload: &[u8]) -> Reply<()> {
        let req: WriteRequest = match decode_request(payload) {
            Ok(req) => req,
            Err(reply) => return reply,
        };
        let node = match self.resolve(&req.node) {
            Ok(node) => node,
            Err(reply) => return reply,
        };
        let index_range = match parse_range(req.index_range.as_deref()) {
            Ok(range) => range,
            Err(reply) => return reply,
        };
        let request = WriteValue {
            value: req.value,
            index_range,
        };
        self.space.write(node, &request, &mut self.model).into()
    }

    fn handle_browse(&self, payload: &[u8]) -> Reply<Vec<ReferenceDescription>> {
        let req: BrowseRequest = match decode_request(payload) {
            Ok(req) => req,
            Err(reply) => return reply,
        };
        let node = match &req.node {
            Some(node) => match self.resolve(node) {
                Ok(node) => node,
                Err(reply) => return reply,
            },
            None => NodeId::OBJECTS_FOLDER,
        };
        self.space.browse(node).into()
    }

    fn handle_schema(&self) -> Reply<String> {
        Reply::Ok(self.space.schema().to_json().to_string())
    }
}

/// The running server: plant, tick loop and NATS connection.
pub struct Server {
    plant: Plant,
    tick: TickLoop,
    conn: NatsConnection,
    prefix: String,
}

impl Server {
    #[must_use]
    pub fn new(plant: Plant, tick: TickLoop, conn: NatsConnection, prefix: String) -> Self {
        Self {
            plant,
            tick,
            conn,
            prefix,
        }
    }

    /// Serve until interrupted, until the request subscription ends, or
    /// until the tick limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if subscribing or the final flush fails.
    /// Failures on individual replies are logged and skipped.
    pub async fn run(mut self) -> Result<(), NetError> {
        let subject = subjects::all(&self.prefix);
        let mut sub = self.conn.subscribe(&subject).await?;
        info!(subject = %subject, "listening for requests");

        let mut interval = self.tick.interval();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                msg = sub.next() => {
                    let Some(msg) = msg else {
                        warn!("request subscription closed");
                        break;
                    };
                    self.dispatch(msg).await;
                }
                _ = interval.tick() => {
                    self.tick.tick(&mut self.plant.model);
                    if self.tick.is_finished() {
                        info!(ticks = self.tick.tick_id(), "tick limit reached");
                        break;
                    }
                }
                result = &mut shutdown => {
                    match result {
                        Ok(()) => info!("interrupt received, shutting down"),
                        Err(e) => error!(error = %e, "failed to listen for interrupt, shutting down"),
                    }
                    break;
                }
            }
        }

        if let Err(e) = sub.unsubscribe().await {
            warn!(error = %e, "failed to unsubscribe");
        }
        self.conn.flush().await?;
        info!(
            ticks = self.tick.tick_id(),
            holding = self.tick.is_holding(),
            "server stopped"
        );
        Ok(())
    }

    async fn dispatch(&mut self, msg: async_nats::Message) {
        let Some(reply_to) = msg.reply.clone() else {
            debug!(subject = %msg.subject, "ignoring message without reply subject");
            return;
        };
        let operation = subjects::operation(&self.prefix, msg.subject.as_str()).unwrap_or("");
        let request_id = msg
            .headers
            .as_ref()
            .and_then(|h| h.get(headers::REQUEST_ID))
            .map(|v| v.as_str().to_string());

        let payload = match self.plant.handle(operation, &msg.payload) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, operation, "failed to encode reply");
                return;
            }
        };
        if let Err(e) = self
            .conn
            .reply(reply_to, request_id.as_deref(), payload)
            .await
        {
            error!(error = %e, "failed to publish reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use cstr_space::Variant;

    use super::*;

    fn plant() -> Plant {
        Plant::build().unwrap().0
    }

    fn call<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        plant: &mut Plant,
        operation: &str,
        request: &Req,
    ) -> Reply<Resp> {
        let payload = encode(request).unwrap();
        decode(&plant.handle(operation, &payload).unwrap()).unwrap()
    }

    fn path(p: &str) -> NodeRef {
        NodeRef::Path(p.to_string())
    }

    #[test]
    fn test_write_then_read_by_path() {
        let mut plant = plant();
        let write = WriteRequest {
            node: path("Valves/HC-2/MANUAL_OUTPUT"),
            value: Some(Variant::Double(35.0)),
            index_range: None,
        };
        let reply: Reply<()> = call(&mut plant, subjects::WRITE, &write);
        assert_eq!(reply, Reply::Ok(()));

        let read = ReadRequest {
            node: path("Valves/HC-2/MANUAL_OUTPUT"),
            index_range: None,
            include_source_timestamp: true,
        };
        let reply: Reply<DataValue> = call(&mut plant, subjects::READ, &read);
        let value = reply.into_result().unwrap();
        assert_eq!(value.value, Variant::Double(35.0));
        assert!(value.source_timestamp.is_some());
    }

    #[test]
    fn test_read_by_id() {
        let mut plant = plant();
        plant.model.reactor.volume = 80.0;
        let node = plant.space.resolve_path("Reactors/1-F/REACTOR_VOLUME").unwrap();
        let read = ReadRequest {
            node: NodeRef::Id(node),
            index_range: None,
            include_source_timestamp: false,
        };
        let reply: Reply<DataValue> = call(&mut plant, subjects::READ, &read);
        let value = reply.into_result().unwrap();
        assert_eq!(value.value, Variant::Double(80.0));
        assert!(value.source_timestamp.is_none());
    }

    fn write(plant: &mut Plant, node: &str, value: f64) {
        let request = WriteRequest {
            node: path(node),
            value: Some(Variant::Double(value)),
            index_range: None,
        };
        let reply: Reply<()> = call(plant, subjects::WRITE, &request);
        assert_eq!(reply, Reply::Ok(()), "write to {node}");
    }

    fn read(plant: &mut Plant, node: &str) -> Variant {
        let request = ReadRequest {
            node: path(node),
            index_range: None,
            include_source_timestamp: false,
        };
        let reply: Reply<DataValue> = call(plant, subjects::READ, &request);
        reply.into_result().unwrap().value
    }

    #[test]
    fn test_writes_reach_outlet_sensor_on_next_tick() {
        let mut plant = plant();
        let mut tick_loop = TickLoop::new(crate::tick::TickConfig::default());

        write(&mut plant, "Reactors/1-F/REACTOR_VOLUME", 100.0);
        write(&mut plant, "Model/Config/K01", 10.0);
        write(&mut plant, "Model/Config/K02", 5.0);
        write(&mut plant, "Model/Config/EA1", 1000.0);
        write(&mut plant, "Model/Config/EA2", 2000.0);
        write(&mut plant, "Valves/HC-1/MANUAL_OUTPUT", 60.0);
        write(&mut plant, "Valves/HC-2/MANUAL_OUTPUT", 50.0);
        write(&mut plant, "Valves/HC-3/MANUAL_OUTPUT", 40.0);

        // Stored immediately, derived outputs untouched until the tick.
        assert_eq!(read(&mut plant, "Valves/HC-2/MANUAL_OUTPUT"), Variant::Double(50.0));
        assert_eq!(read(&mut plant, "Sensors/CRA-2/PROCESS_VALUE"), Variant::Double(0.0));
        assert_eq!(read(&mut plant, "Sensors/FRA-1/PROCESS_VALUE"), Variant::Double(0.0));

        assert!(tick_loop.tick(&mut plant.model).is_committed());
        let Variant::Double(good) = read(&mut plant, "Sensors/CRA-2/PROCESS_VALUE") else {
            panic!("CRA-2 is not a double");
        };
        assert!(good > 0.0);
        assert_eq!(
            read(&mut plant, "Sensors/FRA-1/PROCESS_VALUE"),
            Variant::Double(cstr_model::curve::flow(50.0))
        );

        // No throughput and no kinetics: the outlet sensor keeps its value.
        write(&mut plant, "Valves/HC-2/MANUAL_OUTPUT", 0.0);
        write(&mut plant, "Model/Config/K01", 0.0);
        write(&mut plant, "Model/Config/K02", 0.0);
        assert_eq!(read(&mut plant, "Sensors/CRA-2/PROCESS_VALUE"), Variant::Double(good));

        assert!(!tick_loop.tick(&mut plant.model).is_committed());
        assert!(tick_loop.is_holding());
        assert_eq!(read(&mut plant, "Sensors/FRA-1/PROCESS_VALUE"), Variant::Double(0.0));
        assert_eq!(read(&mut plant, "Sensors/CRA-2/PROCESS_VALUE"), Variant::Double(good));
    }

    #[test]
    fn test_failures_carry_status() {
        let mut plant = plant();

        let write = WriteRequest {
            node: path("Sensors/CRA-2/PROCESS_VALUE"),
            value: Some(Variant::Double(1.0)),
            index_range: None,
        };
        let reply: Reply<()> = call(&mut plant, subjects::WRITE, &write);
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadNotWritable, .. }));

        let write = WriteRequest {
            node: path("Valves/HC-1/MANUAL_OUTPUT"),
            value: Some(Variant::Double(1.0)),
            index_range: Some("0:1".into()),
        };
        let reply: Reply<()> = call(&mut plant, subjects::WRITE, &write);
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadIndexRangeInvalid, .. }));

        let write = WriteRequest {
            node: path("Valves/HC-1/MANUAL_OUTPUT"),
            value: Some(Variant::Double(1.0)),
            index_range: Some("x".into()),
        };
        let reply: Reply<()> = call(&mut plant, subjects::WRITE, &write);
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadIndexRangeInvalid, .. }));

        let read = ReadRequest {
            node: path("Valves/HC-7/MANUAL_OUTPUT"),
            index_range: None,
            include_source_timestamp: false,
        };
        let reply: Reply<DataValue> = call(&mut plant, subjects::READ, &read);
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadNotFound, .. }));

        let read = ReadRequest {
            node: NodeRef::Id(NodeId::numeric(1, 1)),
            index_range: None,
            include_source_timestamp: false,
        };
        let reply: Reply<DataValue> = call(&mut plant, subjects::READ, &read);
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadNodeIdUnknown, .. }));

        assert_eq!(plant.model.valve_concentration_a.manual_output, 0.0);
    }

    #[test]
    fn test_garbage_and_unknown_operations() {
        let mut plant = plant();
        let reply: Reply<()> = decode(&plant.handle(subjects::WRITE, &[0xC1]).unwrap()).unwrap();
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadDecodingError, .. }));

        let reply: Reply<()> = decode(&plant.handle("delete", &[]).unwrap()).unwrap();
        assert!(matches!(reply, Reply::Err { status: StatusCode::BadServiceUnsupported, .. }));
    }

    #[test]
    fn test_browse() {
        let mut plant = plant();
        let reply: Reply<Vec<ReferenceDescription>> =
            call(&mut plant, subjects::BROWSE, &BrowseRequest::default());
        let names: Vec<String> = reply
            .into_result()
            .unwrap()
            .into_iter()
            .map(|r| r.browse_name)
            .collect();
        assert_eq!(names, ["Model", "Valves", "Sensors", "Reactors"]);

        let request = BrowseRequest {
            node: Some(path("Model/Config")),
        };
        let reply: Reply<Vec<ReferenceDescription>> = call(&mut plant, subjects::BROWSE, &request);
        assert_eq!(reply.into_result().unwrap().len(), 5);
    }

    #[test]
    fn test_schema() {
        let mut plant = plant();
        let reply: Reply<String> = call(&mut plant, subjects::SCHEMA, &cstr_net::SchemaRequest {});
        let json: serde_json::Value = serde_json::from_str(&reply.into_result().unwrap()).unwrap();
        assert_eq!(json["types"].as_array().unwrap().len(), 4);
        assert_eq!(json["types"][3]["name"], "MathModelType");
    }
}
