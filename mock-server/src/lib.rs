//! In-memory stand-in for a Ryu controller running `ryu.app.ofctl_rest`.
//!
//! Keeps a flow, group and meter table per switch and answers with the same
//! `{"<dpid>": [...]}` envelope the real controller uses. Unknown datapaths
//! get an empty 404, malformed bodies an empty 400. Any path without a route
//! answers 404 with a JSON body naming the path, which lets tests observe
//! exactly what URI a client built.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// One simulated datapath.
#[derive(Debug, Clone)]
pub struct Switch {
    pub desc: Value,
    pub flows: Vec<Value>,
    pub groups: BTreeMap<u64, Value>,
    pub meters: BTreeMap<u64, Value>,
    pub role: String,
}

impl Switch {
    pub fn new(dpid: u64) -> Self {
        Self {
            desc: json!({
                "mfr_desc": "Nicira, Inc.",
                "hw_desc": "Open vSwitch",
                "sw_desc": "2.3.90",
                "serial_num": "None",
                "dp_desc": format!("mock datapath {dpid}"),
            }),
            flows: Vec::new(),
            groups: BTreeMap::new(),
            meters: BTreeMap::new(),
            role: "EQUAL".to_string(),
        }
    }
}

pub type Db = Arc<RwLock<BTreeMap<u64, Switch>>>;

/// Router with datapaths 1 and 2 connected.
pub fn app() -> Router {
    app_with_switches(&[1, 2])
}

pub fn app_with_switches(dpids: &[u64]) -> Router {
    let switches = dpids.iter().map(|&dpid| (dpid, Switch::new(dpid))).collect();
    let db: Db = Arc::new(RwLock::new(switches));
    Router::new()
        .route("/stats/switches", get(list_switches))
        .route("/stats/desc/{dpid}", get(get_desc))
        .route("/stats/flow/{dpid}", get(get_flows).post(filter_flows))
        .route("/stats/aggregateflow/{dpid}", get(get_aggregate).post(filter_aggregate))
        .route("/stats/flowentry/clear/{dpid}", delete(clear_flows))
        .route("/stats/flowentry/{command}", post(flow_entry))
        .route("/stats/groupentry/{command}", post(group_entry))
        .route("/stats/groupdesc/{dpid}", get(get_groups))
        .route("/stats/meterentry/{command}", post(meter_entry))
        .route("/stats/meterconfig/{dpid}", get(get_meters))
        .route("/stats/meterdesc/{dpid}", get(get_meters))
        .route("/stats/portdesc/modify", post(modify_port))
        .route("/stats/role", post(modify_role))
        .route("/stats/role/{dpid}", get(get_role))
        .route("/stats/experimenter/{dpid}", post(experimenter))
        .fallback(unhandled)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Reply = Result<Json<Value>, StatusCode>;

/// Wrap per-switch data the way the controller does.
fn envelope(dpid: u64, data: Value) -> Json<Value> {
    let mut map = Map::new();
    map.insert(dpid.to_string(), data);
    Json(Value::Object(map))
}

fn parse_body(body: &Bytes) -> Result<Value, StatusCode> {
    serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST)
}

/// The controller accepts the datapath id as a JSON number or a decimal string.
fn payload_dpid(payload: &Value) -> Result<u64, StatusCode> {
    match payload.get("dpid") {
        Some(Value::Number(n)) => n.as_u64().ok_or(StatusCode::BAD_REQUEST),
        Some(Value::String(s)) => s.parse().map_err(|_| StatusCode::BAD_REQUEST),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

async fn unhandled(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "unsupported resource", "path": uri.path()})),
    )
}

async fn list_switches(State(db): State<Db>) -> Json<Vec<u64>> {
    Json(db.read().await.keys().copied().collect())
}

async fn get_desc(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    let switches = db.read().await;
    let switch = switches.get(&dpid).ok_or(StatusCode::NOT_FOUND)?;
    Ok(envelope(dpid, switch.desc.clone()))
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

async fn get_flows(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    select_flows(&db, dpid, &Value::Object(Map::new()))
        .await
        .map(|flows| envelope(dpid, Value::Array(flows)))
}

async fn filter_flows(State(db): State<Db>, Path(dpid): Path<u64>, body: Bytes) -> Reply {
    let filter = parse_body(&body)?;
    select_flows(&db, dpid, &filter).await.map(|flows| envelope(dpid, Value::Array(flows)))
}

async fn get_aggregate(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    let flows = select_flows(&db, dpid, &Value::Object(Map::new())).await?;
    Ok(envelope(dpid, json!([aggregate(&flows)])))
}

async fn filter_aggregate(State(db): State<Db>, Path(dpid): Path<u64>, body: Bytes) -> Reply {
    let filter = parse_body(&body)?;
    let flows = select_flows(&db, dpid, &filter).await?;
    Ok(envelope(dpid, json!([aggregate(&flows)])))
}

async fn select_flows(db: &Db, dpid: u64, filter: &Value) -> Result<Vec<Value>, StatusCode> {
    let filter = filter.as_object().ok_or(StatusCode::BAD_REQUEST)?;
    let switches = db.read().await;
    let switch = switches.get(&dpid).ok_or(StatusCode::NOT_FOUND)?;
    Ok(switch
        .flows
        .iter()
        .filter(|flow| flow_matches_filter(flow, filter))
        .cloned()
        .collect())
}

fn aggregate(flows: &[Value]) -> Value {
    let sum = |key: &str| flows.iter().filter_map(|f| f[key].as_u64()).sum::<u64>();
    json!({
        "packet_count": sum("packet_count"),
        "byte_count": sum("byte_count"),
        "flow_count": flows.len(),
    })
}

/// A filter key names either a top-level flow field (`table_id`, `priority`,
/// `cookie`), the whole `match`, or a single match field such as `in_port`.
fn flow_matches_filter(flow: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(key, wanted)| match key.as_str() {
        "match" => is_submatch(wanted, &flow["match"]),
        _ if flow.get(key).is_some() => &flow[key] == wanted,
        _ => &flow["match"][key] == wanted,
    })
}

/// Every field of `inner` appears in `outer` with the same value.
fn is_submatch(inner: &Value, outer: &Value) -> bool {
    match (inner.as_object(), outer.as_object()) {
        (Some(inner), Some(outer)) => inner.iter().all(|(k, v)| outer.get(k) == Some(v)),
        (None, _) => inner.is_null(),
        _ => false,
    }
}

/// Store a flow the way the controller reports it: defaults filled in,
/// actions rendered as `TYPE:arg` strings, zeroed counters.
fn normalize_flow(payload: &Value) -> Value {
    let field = |key: &str| payload.get(key).cloned().unwrap_or(json!(0));
    json!({
        "priority": field("priority"),
        "cookie": field("cookie"),
        "table_id": field("table_id"),
        "idle_timeout": field("idle_timeout"),
        "hard_timeout": field("hard_timeout"),
        "flags": field("flags"),
        "match": payload.get("match").cloned().unwrap_or_else(|| json!({})),
        "actions": render_actions(payload.get("actions")),
        "packet_count": 0,
        "byte_count": 0,
        "duration_sec": 0,
        "duration_nsec": 0,
        "length": 0,
    })
}

fn render_actions(actions: Option<&Value>) -> Value {
    let Some(actions) = actions.and_then(Value::as_array) else {
        return json!([]);
    };
    actions
        .iter()
        .map(|action| {
            let kind = action["type"].as_str().unwrap_or("UNKNOWN");
            match action.get("port") {
                Some(port) => Value::String(format!("{kind}:{port}")),
                None => Value::String(kind.to_string()),
            }
        })
        .collect()
}

fn same_entry(flow: &Value, payload: &Value, strict: bool) -> bool {
    let wanted_match = payload.get("match").cloned().unwrap_or_else(|| json!({}));
    if strict {
        flow["match"] == wanted_match
            && flow["priority"] == payload.get("priority").cloned().unwrap_or(json!(0))
    } else {
        is_submatch(&wanted_match, &flow["match"])
    }
}

async fn flow_entry(State(db): State<Db>, Path(command): Path<String>, body: Bytes) -> StatusCode {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(status) => return status,
    };
    let dpid = match payload_dpid(&payload) {
        Ok(dpid) => dpid,
        Err(status) => return status,
    };
    let mut switches = db.write().await;
    let Some(switch) = switches.get_mut(&dpid) else {
        return StatusCode::NOT_FOUND;
    };

    match command.as_str() {
        "add" => switch.flows.push(normalize_flow(&payload)),
        "modify" | "modify_strict" => {
            let strict = command == "modify_strict";
            let actions = render_actions(payload.get("actions"));
            for flow in switch.flows.iter_mut().filter(|f| same_entry(f, &payload, strict)) {
                flow["actions"] = actions.clone();
            }
        }
        "delete" | "delete_strict" => {
            let strict = command == "delete_strict";
            switch.flows.retain(|f| !same_entry(f, &payload, strict));
        }
        _ => return StatusCode::NOT_FOUND,
    }
    tracing::debug!(dpid, %command, flows = switch.flows.len(), "flow table updated");
    StatusCode::OK
}

async fn clear_flows(State(db): State<Db>, Path(dpid): Path<u64>) -> StatusCode {
    let mut switches = db.write().await;
    match switches.get_mut(&dpid) {
        Some(switch) => {
            switch.flows.clear();
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

// ---------------------------------------------------------------------------
// Groups and meters
// ---------------------------------------------------------------------------

enum Table {
    Groups,
    Meters,
}

impl Table {
    fn id_field(&self) -> &'static str {
        match self {
            Table::Groups => "group_id",
            Table::Meters => "meter_id",
        }
    }

    fn entries<'a>(&self, switch: &'a mut Switch) -> &'a mut BTreeMap<u64, Value> {
        match self {
            Table::Groups => &mut switch.groups,
            Table::Meters => &mut switch.meters,
        }
    }
}

async fn table_entry(db: &Db, table: Table, command: &str, body: &Bytes) -> StatusCode {
    let Ok(payload) = parse_body(body) else {
        return StatusCode::BAD_REQUEST;
    };
    let Ok(dpid) = payload_dpid(&payload) else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(id) = payload.get(table.id_field()).and_then(Value::as_u64) else {
        return StatusCode::BAD_REQUEST;
    };
    let mut switches = db.write().await;
    let Some(switch) = switches.get_mut(&dpid) else {
        return StatusCode::NOT_FOUND;
    };
    let entries = table.entries(switch);

    match command {
        "add" | "modify" => {
            entries.insert(id, payload);
        }
        "delete" => {
            entries.remove(&id);
        }
        _ => return StatusCode::NOT_FOUND,
    }
    StatusCode::OK
}

async fn group_entry(State(db): State<Db>, Path(command): Path<String>, body: Bytes) -> StatusCode {
    table_entry(&db, Table::Groups, &command, &body).await
}

async fn meter_entry(State(db): State<Db>, Path(command): Path<String>, body: Bytes) -> StatusCode {
    table_entry(&db, Table::Meters, &command, &body).await
}

async fn get_groups(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    let switches = db.read().await;
    let switch = switches.get(&dpid).ok_or(StatusCode::NOT_FOUND)?;
    Ok(envelope(dpid, switch.groups.values().cloned().collect()))
}

async fn get_meters(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    let switches = db.read().await;
    let switch = switches.get(&dpid).ok_or(StatusCode::NOT_FOUND)?;
    Ok(envelope(dpid, switch.meters.values().cloned().collect()))
}

// ---------------------------------------------------------------------------
// Ports, role, experimenter
// ---------------------------------------------------------------------------

async fn modify_port(State(db): State<Db>, body: Bytes) -> StatusCode {
    let Ok(payload) = parse_body(&body) else {
        return StatusCode::BAD_REQUEST;
    };
    let Ok(dpid) = payload_dpid(&payload) else {
        return StatusCode::BAD_REQUEST;
    };
    if payload.get("port_no").is_none() {
        return StatusCode::BAD_REQUEST;
    }
    if db.read().await.contains_key(&dpid) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn modify_role(State(db): State<Db>, body: Bytes) -> StatusCode {
    let Ok(payload) = parse_body(&body) else {
        return StatusCode::BAD_REQUEST;
    };
    let Ok(dpid) = payload_dpid(&payload) else {
        return StatusCode::BAD_REQUEST;
    };
    let role = match payload.get("role").and_then(Value::as_str) {
        Some(role @ ("MASTER" | "SLAVE" | "EQUAL")) => role.to_string(),
        _ => return StatusCode::BAD_REQUEST,
    };
    let mut switches = db.write().await;
    match switches.get_mut(&dpid) {
        Some(switch) => {
            switch.role = role;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn get_role(State(db): State<Db>, Path(dpid): Path<u64>) -> Reply {
    let switches = db.read().await;
    let switch = switches.get(&dpid).ok_or(StatusCode::NOT_FOUND)?;
    Ok(envelope(dpid, json!([{"role": switch.role, "generation_id": 0}])))
}

async fn experimenter(State(db): State<Db>, Path(dpid): Path<u64>, body: Bytes) -> StatusCode {
    if parse_body(&body).is_err() {
        return StatusCode::BAD_REQUEST;
    }
    if db.read().await.contains_key(&dpid) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> Value {
        normalize_flow(&json!({
            "dpid": 1,
            "priority": 100,
            "match": {"in_port": 1, "eth_type": 2048},
            "actions": [{"type": "OUTPUT", "port": 2}, {"type": "POP_VLAN"}]
        }))
    }

    #[test]
    fn normalized_flow_fills_defaults_and_renders_actions() {
        let flow = flow();
        assert_eq!(flow["priority"], 100);
        assert_eq!(flow["table_id"], 0);
        assert_eq!(flow["actions"], json!(["OUTPUT:2", "POP_VLAN"]));
        assert_eq!(flow["packet_count"], 0);
    }

    #[test]
    fn filter_keys_address_fields_or_match() {
        let flow = flow();
        let filter = |v: Value| v.as_object().cloned().unwrap();
        assert!(flow_matches_filter(&flow, &filter(json!({}))));
        assert!(flow_matches_filter(&flow, &filter(json!({"in_port": 1}))));
        assert!(flow_matches_filter(&flow, &filter(json!({"priority": 100, "table_id": 0}))));
        assert!(flow_matches_filter(&flow, &filter(json!({"match": {"in_port": 1}}))));
        assert!(!flow_matches_filter(&flow, &filter(json!({"in_port": 2}))));
        let narrower = filter(json!({"match": {"in_port": 1, "vlan_vid": 3}}));
        assert!(!flow_matches_filter(&flow, &narrower));
    }

    #[test]
    fn strict_entries_need_equal_match_and_priority() {
        let flow = flow();
        let loose = json!({"match": {"in_port": 1}});
        let exact = json!({"match": {"in_port": 1, "eth_type": 2048}, "priority": 100});
        assert!(same_entry(&flow, &loose, false));
        assert!(!same_entry(&flow, &loose, true));
        assert!(same_entry(&flow, &exact, true));
    }

    #[test]
    fn dpid_accepts_numbers_and_strings() {
        assert_eq!(payload_dpid(&json!({"dpid": 7})), Ok(7));
        assert_eq!(payload_dpid(&json!({"dpid": "7"})), Ok(7));
        assert_eq!(payload_dpid(&json!({"dpid": "x"})), Err(StatusCode::BAD_REQUEST));
        assert_eq!(payload_dpid(&json!({})), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn aggregate_sums_counters() {
        let mut a = flow();
        a["packet_count"] = json!(3);
        a["byte_count"] = json!(300);
        let b = flow();
        assert_eq!(
            aggregate(&[a, b]),
            json!({"packet_count": 3, "byte_count": 300, "flow_count": 2})
        );
    }
}
