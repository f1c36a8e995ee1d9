//! `RestClient`: one method per controller operation, one round-trip per call.
//!
//! # Design
//! `RestClient` is `RyuClient` plus a `Transport`. It adds no state of its
//! own beyond the read-only `ClientConfig`; calls are independent and never
//! retried. With `debug` set, each call echoes its URI (reads: the decoded
//! output, writes: the payload) on the `ryu_core::echo` tracing target.

use serde_json::Value;
use tracing::{debug, info};

use crate::client::RyuClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{
    DeviceId, EntryCommand, Filter, FlowCommand, GroupId, MeterId, OpenFlowVersion, Payload,
    PortNo, QueueId,
};

const ECHO_TARGET: &str = "ryu_core::echo";

/// Blocking client for a Ryu controller.
#[derive(Debug, Clone)]
pub struct RestClient<T> {
    client: RyuClient,
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "ureq")]
impl RestClient<crate::transport::UreqTransport> {
    /// Client talking HTTP through the bundled ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> RestClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            client: RyuClient::new(&config.endpoint),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Datapath ids of every switch connected to the controller, in the
    /// order the controller lists them.
    pub fn get_switches(&self) -> Result<Vec<DeviceId>, ApiError> {
        let request = self.client.build_get_switches();
        self.echo_request(&request, "GET SWITCHES", None);
        let response = self.send(&request)?;
        let switches = self.client.parse_switches(response)?;
        if self.config.debug {
            info!(target: ECHO_TARGET, count = switches.len(), ?switches, "output");
        }
        Ok(switches)
    }

    /// Manufacturer, hardware and software description of a switch.
    pub fn get_switch_desc(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_switch_desc(device), "GET SWITCH DESC")
    }

    /// Flow table of a switch, optionally narrowed by `filter`.
    pub fn get_flows(&self, device: &DeviceId, filter: Option<&Filter>) -> Result<Value, ApiError> {
        let request = self.client.build_get_flows(device, filter)?;
        self.read(request, "GET FLOWS")
    }

    /// Aggregate packet/byte/flow counters, optionally narrowed by `filter`.
    pub fn get_aggregate_flows(
        &self,
        device: &DeviceId,
        filter: Option<&Filter>,
    ) -> Result<Value, ApiError> {
        let request = self.client.build_get_aggregate_flows(device, filter)?;
        self.read(request, "GET AGGREGATE FLOW STATS")
    }

    pub fn get_table_stats(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_table_stats(device), "GET TABLE STATS")
    }

    pub fn get_table_features(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_table_features(device), "GET TABLE FEATURES")
    }

    pub fn get_port_stats(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_port_stats(device, port), "GET PORT STATS")
    }

    pub fn get_port_desc(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_port_desc(device, port), "GET PORT DESCRIPTION")
    }

    pub fn get_queue_stats(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_queue_stats(device, port, queue), "GET QUEUE STATS")
    }

    pub fn get_queue_config(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_queue_config(device, port), "GET QUEUE CONFIG")
    }

    pub fn get_queue_desc(
        &self,
        device: &DeviceId,
        port: Option<PortNo>,
        queue: Option<QueueId>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_queue_desc(device, port, queue), "GET QUEUE DESCRIPTION")
    }

    pub fn get_group_stats(
        &self,
        device: &DeviceId,
        group: Option<GroupId>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_group_stats(device, group), "GET GROUP STATS")
    }

    pub fn get_group_desc(
        &self,
        device: &DeviceId,
        group: Option<GroupId>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_group_desc(device, group), "GET GROUP DESCRIPTION")
    }

    pub fn get_group_features(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_group_features(device), "GET GROUP FEATURES")
    }

    pub fn get_meter_stats(
        &self,
        device: &DeviceId,
        meter: Option<MeterId>,
    ) -> Result<Value, ApiError> {
        self.read(self.client.build_get_meter_stats(device, meter), "GET METER STATS")
    }

    pub fn get_meter_desc(
        &self,
        device: &DeviceId,
        meter: Option<MeterId>,
        version: OpenFlowVersion,
    ) -> Result<Value, ApiError> {
        self.read(
            self.client.build_get_meter_desc(device, meter, version),
            "GET METER DESCRIPTION",
        )
    }

    pub fn get_meter_features(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_meter_features(device), "GET METER FEATURES")
    }

    /// Role of the controller as seen by the switch.
    pub fn get_role(&self, device: &DeviceId) -> Result<Value, ApiError> {
        self.read(self.client.build_get_role(device), "GET ROLE")
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn add_flow(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.flow_entry(FlowCommand::Add, payload, "ADD FLOW ENTRY")
    }

    /// Modify every flow entry matching the payload.
    pub fn modify_flow(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.flow_entry(FlowCommand::Modify, payload, "MODIFY FLOW ENTRIES")
    }

    /// Modify the flow entry whose match and priority equal the payload's.
    pub fn modify_flow_strict(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.flow_entry(FlowCommand::ModifyStrict, payload, "MODIFY FLOW ENTRY STRICT")
    }

    /// Delete every flow entry matching the payload.
    pub fn delete_flow(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.flow_entry(FlowCommand::Delete, payload, "DELETE FLOW ENTRIES")
    }

    /// Delete the flow entry whose match and priority equal the payload's.
    pub fn delete_flow_strict(&self, payload: &Payload) -> Result<bool, ApiError> {
        self.flow_entry(FlowCommand::DeleteStrict, payload, "DELETE FLOW ENTRY STRICT")
    }

    /// Remove every flow entry of `device`.
    pub fn clear_flows(&self, device: &DeviceId) -> Result<bool, ApiError> {
        self.write(self.client.build_clear_flows(device), None, "DELETE ALL FLOW ENTRIES")
    }

    pub fn add_group(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_group_entry(EntryCommand::Add, payload)?;
        self.write(request, Some(payload), "ADD GROUP ENTRY")
    }

    pub fn modify_group(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_group_entry(EntryCommand::Modify, payload)?;
        self.write(request, Some(payload), "MODIFY GROUP ENTRY")
    }

    pub fn delete_group(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_group_entry(EntryCommand::Delete, payload)?;
        self.write(request, Some(payload), "DELETE GROUP ENTRY")
    }

    pub fn modify_port(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_modify_port(payload)?;
        self.write(request, Some(payload), "MODIFY PORT")
    }

    pub fn add_meter(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_meter_entry(EntryCommand::Add, payload)?;
        self.write(request, Some(payload), "ADD METER ENTRY")
    }

    pub fn modify_meter(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_meter_entry(EntryCommand::Modify, payload)?;
        self.write(request, Some(payload), "MODIFY METER ENTRY")
    }

    pub fn delete_meter(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_meter_entry(EntryCommand::Delete, payload)?;
        self.write(request, Some(payload), "DELETE METER ENTRY")
    }

    pub fn modify_role(&self, payload: &Payload) -> Result<bool, ApiError> {
        let request = self.client.build_modify_role(payload)?;
        self.write(request, Some(payload), "MODIFY ROLE")
    }

    pub fn send_experimenter(
        &self,
        device: &DeviceId,
        payload: &Payload,
    ) -> Result<bool, ApiError> {
        let request = self.client.build_send_experimenter(device, payload)?;
        self.write(request, Some(payload), "SEND EXPERIMENTER MESSAGE")
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn flow_entry(
        &self,
        command: FlowCommand,
        payload: &Payload,
        title: &str,
    ) -> Result<bool, ApiError> {
        let request = self.client.build_flow_entry(command, payload)?;
        self.write(request, Some(payload), title)
    }

    fn read(&self, request: HttpRequest, title: &str) -> Result<Value, ApiError> {
        self.echo_request(&request, title, None);
        let response = self.send(&request)?;
        let value = self.client.parse_read(response)?;
        if self.config.debug {
            info!(target: ECHO_TARGET, output = %value, "output");
        }
        Ok(value)
    }

    fn write(
        &self,
        request: HttpRequest,
        payload: Option<&Payload>,
        title: &str,
    ) -> Result<bool, ApiError> {
        self.echo_request(&request, title, payload);
        let response = self.send(&request)?;
        let accepted = self.client.parse_write(&response);
        if !accepted {
            debug!(status = response.status, uri = %request.path, "controller rejected request");
        }
        Ok(accepted)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), uri = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    fn echo_request(&self, request: &HttpRequest, title: &str, payload: Option<&Payload>) {
        if !self.config.debug {
            return;
        }
        match payload {
            Some(payload) => info!(target: ECHO_TARGET, uri = %request.path, %payload, "{title}"),
            None => info!(target: ECHO_TARGET, uri = %request.path, "{title}"),
        }
    }
}
