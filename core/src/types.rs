//! Domain values for the controller API.
//!
//! # Design
//! The client never interprets a datapath id, filter or payload; they are
//! carried to the wire verbatim. The newtypes exist so call sites read as
//! "device, filter, payload" instead of three strings and a map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Datapath id of a switch connected to the controller.
///
/// Appended to request paths as a raw segment; no escaping is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// The switch list comes back as JSON integers, while some controller builds
/// and user-written payloads use strings. Both decode to the same id.
impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from(n),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Narrowing criteria for flow reads. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion, replacing any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Mutation body (flow, group, meter, port or role change). Validated by the
/// controller, never by the client.
pub type Payload = Value;

pub type PortNo = u32;
pub type QueueId = u32;
pub type GroupId = u32;
pub type MeterId = u32;

/// OpenFlow protocol version spoken by the target switch.
///
/// Only matters for meter descriptions, whose resource was renamed in 1.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpenFlowVersion {
    #[default]
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
    V1_5,
}

impl OpenFlowVersion {
    /// Map a numeric version such as `1.3` onto the enum. Anything at or
    /// above 1.5 is treated as 1.5.
    pub fn from_f32(version: f32) -> Self {
        if version < 1.1 {
            Self::V1_0
        } else if version < 1.2 {
            Self::V1_1
        } else if version < 1.3 {
            Self::V1_2
        } else if version < 1.4 {
            Self::V1_3
        } else if version < 1.5 {
            Self::V1_4
        } else {
            Self::V1_5
        }
    }

    /// `meterconfig` up to 1.4, `meterdesc` from 1.5 on.
    pub fn meter_desc_resource(self) -> StatsResource {
        if self < Self::V1_5 {
            StatsResource::MeterConfig
        } else {
            StatsResource::MeterDesc
        }
    }
}

impl fmt::Display for OpenFlowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown OpenFlow version '{0}', expected 1.0 to 1.5")]
pub struct ParseVersionError(String);

impl FromStr for OpenFlowVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(['v', 'V']) {
            "1.0" | "1" => Ok(Self::V1_0),
            "1.1" => Ok(Self::V1_1),
            "1.2" => Ok(Self::V1_2),
            "1.3" => Ok(Self::V1_3),
            "1.4" => Ok(Self::V1_4),
            "1.5" => Ok(Self::V1_5),
            _ => Err(ParseVersionError(s.to_string())),
        }
    }
}

/// Read resources under `/stats/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsResource {
    Switches,
    Desc,
    Flow,
    AggregateFlow,
    Table,
    TableFeatures,
    Port,
    PortDesc,
    Queue,
    QueueConfig,
    QueueDesc,
    Group,
    GroupDesc,
    GroupFeatures,
    Meter,
    MeterConfig,
    MeterDesc,
    MeterFeatures,
    Role,
}

impl StatsResource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switches => "switches",
            Self::Desc => "desc",
            Self::Flow => "flow",
            Self::AggregateFlow => "aggregateflow",
            Self::Table => "table",
            Self::TableFeatures => "tablefeatures",
            Self::Port => "port",
            Self::PortDesc => "portdesc",
            Self::Queue => "queue",
            Self::QueueConfig => "queueconfig",
            Self::QueueDesc => "queuedesc",
            Self::Group => "group",
            Self::GroupDesc => "groupdesc",
            Self::GroupFeatures => "groupfeatures",
            Self::Meter => "meter",
            Self::MeterConfig => "meterconfig",
            Self::MeterDesc => "meterdesc",
            Self::MeterFeatures => "meterfeatures",
            Self::Role => "role",
        }
    }
}

/// Flow table mutations, posted to `/stats/flowentry/<command>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCommand {
    Add,
    Modify,
    ModifyStrict,
    Delete,
    DeleteStrict,
}

impl FlowCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::ModifyStrict => "modify_strict",
            Self::Delete => "delete",
            Self::DeleteStrict => "delete_strict",
        }
    }
}

/// Group and meter table mutations, posted to `/stats/{group,meter}entry/<command>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCommand {
    Add,
    Modify,
    Delete,
}

impl EntryCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_decodes_numbers_and_strings() {
        let ids: Vec<DeviceId> = serde_json::from_str(r#"[123917682136708, "2"]"#).unwrap();
        assert_eq!(ids, vec![DeviceId::from("123917682136708"), DeviceId::from("2")]);
    }

    #[test]
    fn device_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&DeviceId::from(7_u64)).unwrap();
        assert_eq!(json, r#""7""#);
    }

    #[test]
    fn filter_serializes_transparently() {
        let filter = Filter::new().with("in_port", 1).with("table_id", 0);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"in_port": 1, "table_id": 0}));
        assert!(Filter::new().is_empty());
    }

    #[test]
    fn version_threshold_selects_meter_resource() {
        assert_eq!(OpenFlowVersion::V1_0.meter_desc_resource(), StatsResource::MeterConfig);
        assert_eq!(OpenFlowVersion::V1_4.meter_desc_resource(), StatsResource::MeterConfig);
        assert_eq!(OpenFlowVersion::V1_5.meter_desc_resource(), StatsResource::MeterDesc);
    }

    #[test]
    fn version_from_f32_rounds_down_and_caps() {
        assert_eq!(OpenFlowVersion::from_f32(1.0), OpenFlowVersion::V1_0);
        assert_eq!(OpenFlowVersion::from_f32(1.3), OpenFlowVersion::V1_3);
        assert_eq!(OpenFlowVersion::from_f32(1.49), OpenFlowVersion::V1_4);
        assert_eq!(OpenFlowVersion::from_f32(1.5), OpenFlowVersion::V1_5);
        assert_eq!(OpenFlowVersion::from_f32(2.0), OpenFlowVersion::V1_5);
    }

    #[test]
    fn version_parses_from_str() {
        assert_eq!("1.3".parse::<OpenFlowVersion>().unwrap(), OpenFlowVersion::V1_3);
        assert_eq!("v1.5".parse::<OpenFlowVersion>().unwrap(), OpenFlowVersion::V1_5);
        assert!("1.6".parse::<OpenFlowVersion>().is_err());
        assert_eq!(OpenFlowVersion::default().to_string(), "1.0");
    }
}
