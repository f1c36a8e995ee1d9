//! Blocking client for the Ryu SDN controller's `ofctl_rest` API.
//!
//! # Overview
//! Every operation turns a typed call into one HTTP request against the
//! controller and hands back the decoded JSON body (reads) or a success flag
//! (writes). There is no session, cache or retry; calls are independent.
//!
//! # Design
//! - `RyuClient` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network, so path construction is testable as data.
//! - `RestClient` pairs a `RyuClient` with a `Transport` and is what most
//!   callers want. The default transport is a blocking ureq agent.
//! - `Switch` binds a `RestClient` to one datapath id for per-device calls.
//! - Reads never look at the status code; writes succeed iff it is 200.
//! - Datapath ids, filters and payloads are passed through uninterpreted.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod rest;
pub mod switch;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::{RyuClient, ALL_PORTS};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use rest::RestClient;
pub use switch::Switch;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    DeviceId, EntryCommand, Filter, FlowCommand, GroupId, MeterId, OpenFlowVersion, Payload,
    PortNo, QueueId, StatsResource,
};
