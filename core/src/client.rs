//! Stateless request builder and response parser for the Ryu `ofctl_rest` API.
//!
//! # Design
//! `RyuClient` holds only the controller endpoint and carries no mutable
//! state between calls. Each operation has a `build_*` method producing an
//! `HttpRequest`; responses go through one of three parsers depending on the
//! kind of operation:
//!
//! - reads decode the body and ignore the status code,
//! - the switch list decodes into typed `DeviceId`s,
//! - writes only look at the status code (`200` is success).
//!
//! `RestClient` pairs these with a `Transport`; callers that do their own I/O
//! can use `RyuClient` directly.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    DeviceId, EntryCommand, Filter, FlowCommand, GroupId, MeterId, OpenFlowVersion, Payload,
    PortNo, QueueId, StatsResource,
};

/// Stands in for "any port" when only a queue id is given.
pub const ALL_PORTS: &str = "ALL";

/// The only status the controller uses for an accepted mutation.
const STATUS_OK: u16 = 200;

/// Synchronous, stateless client for the controller's REST API.
#[derive(Debug, Clone)]
pub struct RyuClient {
    base_url: String,
}

impl RyuClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Switch information
    // -----------------------------------------------------------------------

    pub fn build_get_switches(&self) -> HttpRequest {
        get(format!("{}/stats/{}", self.base_url, StatsResource::Switches.as_str()))
    }

    pub fn build_get_switch_desc(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::Desc, device))
    }

    // -----------------------------------------------------------------------
    // Flows and tables
    // -----------------------------------------------------------------------

    /// Flow entries of `device`. A non-empty filter turns the GET into a POST
    /// carrying the filter as its JSON body.
    pub fn build_get_flows(
        &self,
        device: &DeviceId,
        filter: Option<&Filter>,
    ) -> Result<HttpRequest, ApiError> {
        self.filtered_read(StatsResource::Flow, device, filter)
    }

    /// Aggregate flow counters of `device`, with the same GET/POST rule as
    /// `build_get_flows`.
    pub fn build_get_aggregate_flows(
        &self,
        device: &DeviceId,
        filter: Option<&Filter>,
    ) -> Result<HttpRequest, ApiError> {
        self.filtered_read(StatsResource::AggregateFlow, device, filter)
    }

    pub fn build_get_table_stats(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::Table, device))
    }

    pub fn build_get_table_features(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::TableFeatures, device))
    }

    // -----------------------------------------------------------------------
    // Ports and queues
    // -----------------------------------------------------------------------

    pub fn build_get_port_stats(&self, device: &DeviceId, port: Option<PortNo>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::Port, device), port))
    }

    /// Port descriptions. Selecting a single port needs an OpenFlow 1.5 switch;
    /// the client does not enforce that.
    pub fn build_get_port_desc(&self, device: &DeviceId, port: Option<PortNo>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::PortDesc, device), port))
    }

    pub fn build_get_queue_stats(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> HttpRequest {
        get(with_port_and_queue(self.stats_path(StatsResource::Queue, device), port, queue))
    }

    pub fn build_get_queue_config(&self, device: &DeviceId, port: Option<PortNo>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::QueueConfig, device), port))
    }

    pub fn build_get_queue_desc(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> HttpRequest {
        get(with_port_and_queue(self.stats_path(StatsResource::QueueDesc, device), port, queue))
    }

    // -----------------------------------------------------------------------
    // Groups and meters
    // -----------------------------------------------------------------------

    pub fn build_get_group_stats(&self, device: &DeviceId, group: Option<GroupId>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::Group, device), group))
    }

    pub fn build_get_group_desc(&self, device: &DeviceId, group: Option<GroupId>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::GroupDesc, device), group))
    }

    pub fn build_get_group_features(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::GroupFeatures, device))
    }

    pub fn build_get_meter_stats(&self, device: &DeviceId, meter: Option<MeterId>) -> HttpRequest {
        get(with_segment(self.stats_path(StatsResource::Meter, device), meter))
    }

    /// Meter configuration. The resource is `meterconfig` before OpenFlow 1.5
    /// and `meterdesc` from 1.5 on.
    pub fn build_get_meter_desc(
        &self,
        device: &DeviceId,
        meter: Option<MeterId>,
        version: OpenFlowVersion,
    ) -> HttpRequest {
        let root = self.stats_path(version.meter_desc_resource(), device);
        get(with_segment(root, meter))
    }

    pub fn build_get_meter_features(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::MeterFeatures, device))
    }

    pub fn build_get_role(&self, device: &DeviceId) -> HttpRequest {
        get(self.stats_path(StatsResource::Role, device))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn build_flow_entry(
        &self,
        command: FlowCommand,
        payload: &Payload,
    ) -> Result<HttpRequest, ApiError> {
        post_json(
            format!("{}/stats/flowentry/{}", self.base_url, command.as_str()),
            payload,
        )
    }

    /// Remove every flow entry of `device`.
    pub fn build_clear_flows(&self, device: &DeviceId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/stats/flowentry/clear/{device}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_group_entry(
        &self,
        command: EntryCommand,
        payload: &Payload,
    ) -> Result<HttpRequest, ApiError> {
        post_json(
            format!("{}/stats/groupentry/{}", self.base_url, command.as_str()),
            payload,
        )
    }

    pub fn build_meter_entry(
        &self,
        command: EntryCommand,
        payload: &Payload,
    ) -> Result<HttpRequest, ApiError> {
        post_json(
            format!("{}/stats/meterentry/{}", self.base_url, command.as_str()),
            payload,
        )
    }

    pub fn build_modify_port(&self, payload: &Payload) -> Result<HttpRequest, ApiError> {
        post_json(format!("{}/stats/portdesc/modify", self.base_url), payload)
    }

    pub fn build_modify_role(&self, payload: &Payload) -> Result<HttpRequest, ApiError> {
        post_json(format!("{}/stats/role", self.base_url), payload)
    }

    pub fn build_send_experimenter(
        &self,
        device: &DeviceId,
        payload: &Payload,
    ) -> Result<HttpRequest, ApiError> {
        post_json(format!("{}/stats/experimenter/{device}", self.base_url), payload)
    }

    // -----------------------------------------------------------------------
    // Parsers
    // -----------------------------------------------------------------------

    /// Decode a read response. The status code is deliberately not checked:
    /// whatever the controller sent is decoded and handed back.
    pub fn parse_read(&self, response: HttpResponse) -> Result<Value, ApiError> {
        decode(response)
    }

    /// Decode the switch list, preserving the controller's order.
    pub fn parse_switches(&self, response: HttpResponse) -> Result<Vec<DeviceId>, ApiError> {
        decode(response)
    }

    /// `true` iff the controller answered 200.
    pub fn parse_write(&self, response: &HttpResponse) -> bool {
        response.status == STATUS_OK
    }

    fn stats_path(&self, resource: StatsResource, device: &DeviceId) -> String {
        format!("{}/stats/{}/{device}", self.base_url, resource.as_str())
    }

    fn filtered_read(
        &self,
        resource: StatsResource,
        device: &DeviceId,
        filter: Option<&Filter>,
    ) -> Result<HttpRequest, ApiError> {
        let path = self.stats_path(resource, device);
        match filter {
            Some(filter) if !filter.is_empty() => post_json(path, filter),
            _ => Ok(get(path)),
        }
    }
}

fn get(path: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn post_json<B: Serialize + ?Sized>(path: String, body: &B) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method: HttpMethod::Post,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn with_segment(path: String, segment: Option<u32>) -> String {
    match segment {
        Some(value) => format!("{path}/{value}"),
        None => path,
    }
}

fn with_port_and_queue(path: String, port: Option<PortNo>, queue: Option<QueueId>) -> String {
    match (port, queue) {
        (None, None) => path,
        (Some(port), None) => format!("{path}/{port}"),
        (None, Some(queue)) => format!("{path}/{ALL_PORTS}/{queue}"),
        (Some(port), Some(queue)) => format!("{path}/{port}/{queue}"),
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization {
        message: e.to_string(),
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> RyuClient {
        RyuClient::new("http://localhost:8080")
    }

    fn dpid() -> DeviceId {
        DeviceId::from("1")
    }

    #[test]
    fn build_get_switches_produces_correct_request() {
        let req = client().build_get_switches();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/stats/switches");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RyuClient::new("http://10.0.0.5:8080/");
        let req = client.build_get_switch_desc(&dpid());
        assert_eq!(req.path, "http://10.0.0.5:8080/stats/desc/1");
    }

    #[test]
    fn device_id_is_not_escaped() {
        let req = client().build_get_table_stats(&DeviceId::from("a b/c"));
        assert_eq!(req.path, "http://localhost:8080/stats/table/a b/c");
    }

    #[test]
    fn unfiltered_flow_read_is_a_get() {
        let req = client().build_get_flows(&dpid(), None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/stats/flow/1");
        assert!(req.body.is_none());

        let req = client().build_get_flows(&dpid(), Some(&Filter::new())).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn filtered_flow_read_is_a_post_with_body() {
        let filter = Filter::new().with("in_port", 1);
        let req = client().build_get_flows(&dpid(), Some(&filter)).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/stats/flow/1");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"in_port": 1}));
    }

    #[test]
    fn aggregate_flow_read_follows_the_same_rule() {
        let req = client().build_get_aggregate_flows(&dpid(), None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/stats/aggregateflow/1");

        let filter = Filter::new().with("table_id", 0);
        let req = client().build_get_aggregate_flows(&dpid(), Some(&filter)).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
    }

    #[test]
    fn optional_segment_is_appended_only_when_present() {
        let c = client();
        assert_eq!(
            c.build_get_port_stats(&dpid(), None).path,
            "http://localhost:8080/stats/port/1"
        );
        assert_eq!(
            c.build_get_port_stats(&dpid(), Some(3)).path,
            "http://localhost:8080/stats/port/1/3"
        );
        assert_eq!(
            c.build_get_port_desc(&dpid(), Some(2)).path,
            "http://localhost:8080/stats/portdesc/1/2"
        );
        assert_eq!(
            c.build_get_queue_config(&dpid(), Some(4)).path,
            "http://localhost:8080/stats/queueconfig/1/4"
        );
        assert_eq!(
            c.build_get_group_stats(&dpid(), Some(7)).path,
            "http://localhost:8080/stats/group/1/7"
        );
        assert_eq!(
            c.build_get_group_desc(&dpid(), None).path,
            "http://localhost:8080/stats/groupdesc/1"
        );
        assert_eq!(
            c.build_get_meter_stats(&dpid(), Some(1)).path,
            "http://localhost:8080/stats/meter/1/1"
        );
    }

    #[test]
    fn queue_dispatch_covers_all_four_cases() {
        let c = client();
        let cases = [
            (None, None, "http://localhost:8080/stats/queue/1"),
            (Some(3), None, "http://localhost:8080/stats/queue/1/3"),
            (None, Some(4), "http://localhost:8080/stats/queue/1/ALL/4"),
            (Some(2), Some(2), "http://localhost:8080/stats/queue/1/2/2"),
        ];
        for (port, queue, expected) in cases {
            let req = c.build_get_queue_stats(&dpid(), port, queue);
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(req.path, expected, "port={port:?} queue={queue:?}");
        }
        assert_eq!(
            c.build_get_queue_desc(&dpid(), None, Some(1)).path,
            "http://localhost:8080/stats/queuedesc/1/ALL/1"
        );
    }

    #[test]
    fn meter_desc_path_depends_on_version() {
        let c = client();
        assert_eq!(
            c.build_get_meter_desc(&dpid(), None, OpenFlowVersion::V1_3).path,
            "http://localhost:8080/stats/meterconfig/1"
        );
        assert_eq!(
            c.build_get_meter_desc(&dpid(), Some(3), OpenFlowVersion::V1_4).path,
            "http://localhost:8080/stats/meterconfig/1/3"
        );
        assert_eq!(
            c.build_get_meter_desc(&dpid(), None, OpenFlowVersion::V1_5).path,
            "http://localhost:8080/stats/meterdesc/1"
        );
        assert_eq!(
            c.build_get_meter_desc(&dpid(), Some(3), OpenFlowVersion::V1_5).path,
            "http://localhost:8080/stats/meterdesc/1/3"
        );
    }

    #[test]
    fn fixed_read_paths() {
        let c = client();
        assert_eq!(
            c.build_get_table_features(&dpid()).path,
            "http://localhost:8080/stats/tablefeatures/1"
        );
        assert_eq!(
            c.build_get_group_features(&dpid()).path,
            "http://localhost:8080/stats/groupfeatures/1"
        );
        assert_eq!(
            c.build_get_meter_features(&dpid()).path,
            "http://localhost:8080/stats/meterfeatures/1"
        );
        assert_eq!(c.build_get_role(&dpid()).path, "http://localhost:8080/stats/role/1");
    }

    #[test]
    fn flow_entry_commands_map_to_paths() {
        let c = client();
        let payload = json!({"dpid": 1, "match": {"in_port": 1}});
        let cases = [
            (FlowCommand::Add, "add"),
            (FlowCommand::Modify, "modify"),
            (FlowCommand::ModifyStrict, "modify_strict"),
            (FlowCommand::Delete, "delete"),
            (FlowCommand::DeleteStrict, "delete_strict"),
        ];
        for (command, suffix) in cases {
            let req = c.build_flow_entry(command, &payload).unwrap();
            assert_eq!(req.method, HttpMethod::Post);
            assert_eq!(req.path, format!("http://localhost:8080/stats/flowentry/{suffix}"));
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(body, payload);
        }
    }

    #[test]
    fn clear_flows_is_a_delete_without_body() {
        let req = client().build_clear_flows(&dpid());
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8080/stats/flowentry/clear/1");
        assert!(req.body.is_none());
    }

    #[test]
    fn other_mutation_paths() {
        let c = client();
        let payload = json!({"dpid": 1});
        assert_eq!(
            c.build_group_entry(EntryCommand::Delete, &payload).unwrap().path,
            "http://localhost:8080/stats/groupentry/delete"
        );
        assert_eq!(
            c.build_meter_entry(EntryCommand::Modify, &payload).unwrap().path,
            "http://localhost:8080/stats/meterentry/modify"
        );
        assert_eq!(
            c.build_modify_port(&payload).unwrap().path,
            "http://localhost:8080/stats/portdesc/modify"
        );
        assert_eq!(c.build_modify_role(&payload).unwrap().path, "http://localhost:8080/stats/role");
        assert_eq!(
            c.build_send_experimenter(&dpid(), &payload).unwrap().path,
            "http://localhost:8080/stats/experimenter/1"
        );
    }

    #[test]
    fn parse_read_ignores_status() {
        let response = HttpResponse::new(404, r#"{"error": "no such switch"}"#);
        let value = client().parse_read(response).unwrap();
        assert_eq!(value["error"], "no such switch");
    }

    #[test]
    fn parse_read_bad_json() {
        let response = HttpResponse::new(500, "Internal Server Error");
        let err = client().parse_read(response).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization { .. }));
        assert_eq!(err.body(), Some("Internal Server Error"));
    }

    #[test]
    fn parse_switches_keeps_order() {
        let response = HttpResponse::new(200, "[3, 1, 2]");
        let ids = client().parse_switches(response).unwrap();
        let ids: Vec<&str> = ids.iter().map(DeviceId::as_str).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn parse_write_only_accepts_200() {
        let c = client();
        assert!(c.parse_write(&HttpResponse::new(200, "")));
        assert!(!c.parse_write(&HttpResponse::new(201, "")));
        assert!(!c.parse_write(&HttpResponse::new(400, "")));
        assert!(!c.parse_write(&HttpResponse::new(500, "")));
    }
}
