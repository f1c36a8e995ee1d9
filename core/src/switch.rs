//! A handle bound to one datapath.
//!
//! `Switch` borrows a `RestClient` and remembers a `DeviceId`, so per-device
//! calls drop the id argument:
//!
//! ```no_run
//! # use ryu_core::{ClientConfig, RestClient};
//! let client = RestClient::new(ClientConfig::default());
//! let switches = client.get_switches()?;
//! let switch = client.switch(switches[0].clone());
//! let flows = switch.flows(None)?;
//! # Ok::<(), ryu_core::ApiError>(())
//! ```

use serde_json::Value;

use crate::error::ApiError;
use crate::http::Transport;
use crate::rest::RestClient;
use crate::types::{DeviceId, Filter, GroupId, MeterId, OpenFlowVersion, Payload, PortNo, QueueId};

#[derive(Debug, Clone)]
pub struct Switch<'a, T> {
    client: &'a RestClient<T>,
    id: DeviceId,
}

impl<T: Transport> RestClient<T> {
    /// Handle for the switch with datapath id `id`.
    pub fn switch(&self, id: impl Into<DeviceId>) -> Switch<'_, T> {
        Switch::new(self, id)
    }
}

impl<'a, T: Transport> Switch<'a, T> {
    pub fn new(client: &'a RestClient<T>, id: impl Into<DeviceId>) -> Self {
        Self {
            client,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn desc(&self) -> Result<Value, ApiError> {
        self.client.get_switch_desc(&self.id)
    }

    pub fn flows(&self, filter: Option<&Filter>) -> Result<Value, ApiError> {
        self.client.get_flows(&self.id, filter)
    }

    pub fn aggregate_flows(&self, filter: Option<&Filter>) -> Result<Value, ApiError> {
        self.client.get_aggregate_flows(&self.id, filter)
    }

    pub fn table_stats(&self) -> Result<Value, ApiError> {
        self.client.get_table_stats(&self.id)
    }

    pub fn table_features(&self) -> Result<Value, ApiError> {
        self.client.get_table_features(&self.id)
    }

    pub fn port_stats(&self, port: Option<PortNo>) -> Result<Value, ApiError> {
        self.client.get_port_stats(&self.id, port)
    }

    pub fn port_desc(&self, port: Option<PortNo>) -> Result<Value, ApiError> {
        self.client.get_port_desc(&self.id, port)
    }

    pub fn queue_stats(
        &self,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> Result<Value, ApiError> {
        self.client.get_queue_stats(&self.id, port, queue)
    }

    pub fn queue_config(&self, port: Option<PortNo>) -> Result<Value, ApiError> {
        self.client.get_queue_config(&self.id, port)
    }

    pub fn queue_desc(
        &self,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> Result<Value, ApiError> {
        self.client.get_queue_desc(&self.id, port, queue)
    }

    pub fn group_stats(&self, group: Option<GroupId>) -> Result<Value, ApiError> {
        self.client.get_group_stats(&self.id, group)
    }

    pub fn group_desc(&self, group: Option<GroupId>) -> Result<Value, ApiError> {
        self.client.get_group_desc(&self.id, group)
    }

    pub fn group_features(&self) -> Result<Value, ApiError> {
        self.client.get_group_features(&self.id)
    }

    pub fn meter_stats(&self, meter: Option<MeterId>) -> Result<Value, ApiError> {
        self.client.get_meter_stats(&self.id, meter)
    }

    pub fn meter_desc(
        &self,
        meter: Option<MeterId>,
        version: OpenFlowVersion,
    ) -> Result<Value, ApiError> {
        self.client.get_meter_desc(&self.id, meter, version)
    }

    pub fn meter_features(&self) -> Result<Value, ApiError> {
        self.client.get_meter_features(&self.id)
    }

    pub fn role(&self) -> Result<Value, ApiError> {
        self.client.get_role(&self.id)
    }

    /// Add a flow entry to this switch. A payload object without a `dpid`
    /// gets this switch's id; an explicit `dpid` is sent unchanged.
    pub fn add_flow(&self, payload: &Payload) -> Result<bool, ApiError> {
        match payload {
            Value::Object(map) if !map.contains_key("dpid") => {
                let mut map = map.clone();
                map.insert("dpid".to_string(), self.dpid_value());
                self.client.add_flow(&Value::Object(map))
            }
            _ => self.client.add_flow(payload),
        }
    }

    pub fn clear_flows(&self) -> Result<bool, ApiError> {
        self.client.clear_flows(&self.id)
    }

    pub fn send_experimenter(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.client.send_experimenter(&self.id, payload)
    }

    /// Numeric ids go out as JSON numbers, anything else as a string.
    fn dpid_value(&self) -> Value {
        self.id
            .as_str()
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(self.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};

    struct Recorder {
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    fn client(recorder: &Recorder) -> RestClient<&Recorder> {
        RestClient::with_transport(ClientConfig::default(), recorder)
    }

    #[test]
    fn reads_use_the_bound_dpid() {
        let recorder = Recorder::new();
        let client = client(&recorder);
        let switch = client.switch(123917682136708u64);
        assert_eq!(switch.id().as_str(), "123917682136708");

        switch.flows(None).unwrap();
        assert_eq!(recorder.last().path, "http://localhost:8080/stats/flow/123917682136708");
        switch.queue_stats(None, Some(3)).unwrap();
        assert_eq!(recorder.last().path, "http://localhost:8080/stats/queue/123917682136708/ALL/3");
        switch.meter_desc(Some(1), OpenFlowVersion::V1_5).unwrap();
        assert_eq!(recorder.last().path, "http://localhost:8080/stats/meterdesc/123917682136708/1");
        switch.role().unwrap();
        assert_eq!(recorder.last().path, "http://localhost:8080/stats/role/123917682136708");
    }

    #[test]
    fn add_flow_fills_in_a_missing_dpid() {
        let recorder = Recorder::new();
        let client = client(&recorder);
        let switch = client.switch("7");

        let rule = json!({"priority": 100, "match": {"in_port": 1}});
        assert!(switch.add_flow(&rule).unwrap());
        let sent: Value = serde_json::from_str(recorder.last().body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["dpid"], 7);
        assert_eq!(sent["priority"], 100);
    }

    #[test]
    fn add_flow_keeps_an_explicit_dpid() {
        let recorder = Recorder::new();
        let client = client(&recorder);
        let switch = client.switch("7");

        let rule = json!({"dpid": "0x7", "priority": 1});
        switch.add_flow(&rule).unwrap();
        let sent: Value = serde_json::from_str(recorder.last().body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, rule);
    }

    #[test]
    fn clear_flows_targets_the_bound_dpid() {
        let recorder = Recorder::new();
        let client = client(&recorder);
        assert!(client.switch("2").clear_flows().unwrap());
        let request = recorder.last();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.path, "http://localhost:8080/stats/flowentry/clear/2");
    }
}
