//! Command dispatch. Reads print pretty JSON; writes print `ok` or fail with
//! `CliError::Rejected`.

use std::io::Write;

use serde_json::{Map, Value};

use ryu_core::{ApiError, DeviceId, EntryCommand, Filter, FlowCommand, RestClient, Transport};

use crate::cli::{Command, QueueView};
use crate::error::CliError;

pub fn dispatch<T: Transport>(
    command: Command,
    client: &RestClient<T>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let api = |err: ApiError| CliError::from_api(&client.config().endpoint, err);

    match command {
        Command::Demo { add_flow } => demo(client, add_flow.as_deref(), out),
        Command::Switches => {
            let switches = client.get_switches().map_err(api)?;
            print_json(out, &switches)
        }
        Command::Desc { dpid } => {
            let desc = client.get_switch_desc(&DeviceId::from(dpid)).map_err(api)?;
            print_json(out, &desc)
        }
        Command::Flows {
            dpid,
            filter,
            aggregate,
        } => {
            let device = DeviceId::from(dpid);
            let filter = parse_filter(filter.as_deref())?;
            let value = if aggregate {
                client.get_aggregate_flows(&device, filter.as_ref())
            } else {
                client.get_flows(&device, filter.as_ref())
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Tables { dpid, features } => {
            let device = DeviceId::from(dpid);
            let value = if features {
                client.get_table_features(&device)
            } else {
                client.get_table_stats(&device)
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Ports { dpid, port, desc } => {
            let device = DeviceId::from(dpid);
            let value = if desc {
                client.get_port_desc(&device, port)
            } else {
                client.get_port_stats(&device, port)
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Queues {
            dpid,
            port,
            queue,
            view,
        } => {
            let device = DeviceId::from(dpid);
            let value = match view {
                QueueView::Stats => client.get_queue_stats(&device, port, queue),
                QueueView::Desc => client.get_queue_desc(&device, port, queue),
                QueueView::Config if queue.is_some() => {
                    return Err(CliError::Usage(
                        "queue configuration is per port; drop --queue".to_string(),
                    ))
                }
                QueueView::Config => client.get_queue_config(&device, port),
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Groups {
            dpid,
            group,
            desc,
            features,
        } => {
            let device = DeviceId::from(dpid);
            let value = if features {
                client.get_group_features(&device)
            } else if desc {
                client.get_group_desc(&device, group)
            } else {
                client.get_group_stats(&device, group)
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Meters {
            dpid,
            meter,
            desc,
            features,
            version,
        } => {
            let device = DeviceId::from(dpid);
            let value = if features {
                client.get_meter_features(&device)
            } else if desc {
                client.get_meter_desc(&device, meter, version)
            } else {
                client.get_meter_stats(&device, meter)
            }
            .map_err(api)?;
            print_json(out, &value)
        }
        Command::Role { dpid } => {
            let role = client.get_role(&DeviceId::from(dpid)).map_err(api)?;
            print_json(out, &role)
        }
        Command::Flow { action, payload } => {
            let payload = parse_payload(&payload)?;
            let accepted = match FlowCommand::from(action) {
                FlowCommand::Add => client.add_flow(&payload),
                FlowCommand::Modify => client.modify_flow(&payload),
                FlowCommand::ModifyStrict => client.modify_flow_strict(&payload),
                FlowCommand::Delete => client.delete_flow(&payload),
                FlowCommand::DeleteStrict => client.delete_flow_strict(&payload),
            }
            .map_err(api)?;
            report(accepted, out)
        }
        Command::ClearFlows { dpid } => {
            let accepted = client.clear_flows(&DeviceId::from(dpid)).map_err(api)?;
            report(accepted, out)
        }
        Command::Group { action, payload } => {
            let payload = parse_payload(&payload)?;
            let accepted = match EntryCommand::from(action) {
                EntryCommand::Add => client.add_group(&payload),
                EntryCommand::Modify => client.modify_group(&payload),
                EntryCommand::Delete => client.delete_group(&payload),
            }
            .map_err(api)?;
            report(accepted, out)
        }
        Command::Meter { action, payload } => {
            let payload = parse_payload(&payload)?;
            let accepted = match EntryCommand::from(action) {
                EntryCommand::Add => client.add_meter(&payload),
                EntryCommand::Modify => client.modify_meter(&payload),
                EntryCommand::Delete => client.delete_meter(&payload),
            }
            .map_err(api)?;
            report(accepted, out)
        }
        Command::PortMod { payload } => {
            let accepted = client.modify_port(&parse_payload(&payload)?).map_err(api)?;
            report(accepted, out)
        }
        Command::SetRole { payload } => {
            let accepted = client.modify_role(&parse_payload(&payload)?).map_err(api)?;
            report(accepted, out)
        }
        Command::Experimenter { dpid, payload } => {
            let accepted = client
                .send_experimenter(&DeviceId::from(dpid), &parse_payload(&payload)?)
                .map_err(api)?;
            report(accepted, out)
        }
    }
}

/// Discover switches, pick the first, and dump what the controller knows
/// about it. With `add_flow`, install that entry and show the table again.
fn demo<T: Transport>(
    client: &RestClient<T>,
    add_flow: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let api = |err: ApiError| CliError::from_api(&client.config().endpoint, err);

    let rule = add_flow.map(parse_payload).transpose()?;

    let switches = client.get_switches().map_err(api)?;
    let dpid = switches.first().ok_or(CliError::NoSwitches)?;
    let switch = client.switch(dpid.clone());
    writeln!(out, "{dpid}")?;

    print_json(out, &switch.desc().map_err(api)?)?;
    print_json(out, &switch.flows(None).map_err(api)?)?;
    print_json(out, &switch.aggregate_flows(None).map_err(api)?)?;

    if let Some(rule) = rule {
        report(switch.add_flow(&rule).map_err(api)?, out)?;
        print_json(out, &switch.flows(None).map_err(api)?)?;
    }
    Ok(())
}

fn print_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn parse_payload(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::InvalidJson {
        what: "payload",
        source,
    })
}

fn parse_filter(raw: Option<&str>) -> Result<Option<Filter>, CliError> {
    raw.map(|raw| {
        serde_json::from_str::<Map<String, Value>>(raw)
            .map(Filter::from)
            .map_err(|source| CliError::InvalidJson {
                what: "filter",
                source,
            })
    })
    .transpose()
}

fn report(accepted: bool, out: &mut impl Write) -> Result<(), CliError> {
    if accepted {
        writeln!(out, "ok")?;
        Ok(())
    } else {
        Err(CliError::Rejected)
    }
}
