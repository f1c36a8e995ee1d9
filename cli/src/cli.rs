//! Argument parsing.
//!
//! The literal `debug` in first position is not a clap argument: it is
//! stripped before parsing so `ryu-rest debug flows 1` turns on request
//! echoing for that one invocation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ryu_core::{ClientConfig, EntryCommand, FlowCommand, OpenFlowVersion};

#[derive(Debug, Parser)]
#[command(
    name = "ryu-rest",
    version,
    about = "Query and program switches through a Ryu controller's REST API",
    after_help = "Pass `debug` as the first argument to echo every request URI and payload."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller REST endpoint
    #[arg(long, short = 'e', global = true)]
    pub endpoint: Option<String>,

    /// TOML config file (defaults to ./ryu-rest.toml when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover switches, then dump the first one's description and flows
    Demo {
        /// Flow entry (JSON) to add to that switch before re-reading its table;
        /// `dpid` is filled in when absent
        #[arg(long, value_name = "JSON")]
        add_flow: Option<String>,
    },

    /// List the datapath ids of all connected switches
    Switches,

    /// Switch hardware and software description
    Desc { dpid: String },

    /// Flow table, optionally filtered (a JSON object turns the read into a POST)
    Flows {
        dpid: String,
        #[arg(long)]
        filter: Option<String>,
        /// Aggregate counters instead of individual entries
        #[arg(long)]
        aggregate: bool,
    },

    /// Table statistics or features
    Tables {
        dpid: String,
        #[arg(long)]
        features: bool,
    },

    /// Port statistics or descriptions
    Ports {
        dpid: String,
        #[arg(long)]
        port: Option<u32>,
        #[arg(long)]
        desc: bool,
    },

    /// Queue statistics, config or descriptions
    Queues {
        dpid: String,
        #[arg(long)]
        port: Option<u32>,
        /// Queue id; not accepted with `--view config`
        #[arg(long)]
        queue: Option<u32>,
        #[arg(long, value_enum, default_value_t = QueueView::Stats)]
        view: QueueView,
    },

    /// Group statistics, descriptions or features
    Groups {
        dpid: String,
        #[arg(long, conflicts_with = "features")]
        group: Option<u32>,
        #[arg(long, conflicts_with = "features")]
        desc: bool,
        #[arg(long)]
        features: bool,
    },

    /// Meter statistics, descriptions or features
    Meters {
        dpid: String,
        #[arg(long, conflicts_with = "features")]
        meter: Option<u32>,
        #[arg(long, conflicts_with = "features")]
        desc: bool,
        #[arg(long)]
        features: bool,
        /// OpenFlow version of the switch; selects meterconfig or meterdesc
        #[arg(long = "of-version", default_value = "1.0")]
        version: OpenFlowVersion,
    },

    /// Controller role as seen by the switch
    Role { dpid: String },

    /// Add, modify or delete flow entries
    Flow {
        action: FlowAction,
        /// Flow entry as JSON, including its dpid
        payload: String,
    },

    /// Delete every flow entry of a switch
    ClearFlows { dpid: String },

    /// Add, modify or delete a group entry
    Group {
        action: EntryAction,
        payload: String,
    },

    /// Add, modify or delete a meter entry
    Meter {
        action: EntryAction,
        payload: String,
    },

    /// Modify port behaviour
    PortMod { payload: String },

    /// Request a controller role change
    SetRole { payload: String },

    /// Send an experimenter message
    Experimenter { dpid: String, payload: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueView {
    Stats,
    /// OpenFlow 1.0 to 1.3
    Config,
    /// OpenFlow 1.4+
    Desc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FlowAction {
    Add,
    Modify,
    ModifyStrict,
    Delete,
    DeleteStrict,
}

impl From<FlowAction> for FlowCommand {
    fn from(action: FlowAction) -> Self {
        match action {
            FlowAction::Add => FlowCommand::Add,
            FlowAction::Modify => FlowCommand::Modify,
            FlowAction::ModifyStrict => FlowCommand::ModifyStrict,
            FlowAction::Delete => FlowCommand::Delete,
            FlowAction::DeleteStrict => FlowCommand::DeleteStrict,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EntryAction {
    Add,
    Modify,
    Delete,
}

impl From<EntryAction> for EntryCommand {
    fn from(action: EntryAction) -> Self {
        match action {
            EntryAction::Add => EntryCommand::Add,
            EntryAction::Modify => EntryCommand::Modify,
            EntryAction::Delete => EntryCommand::Delete,
        }
    }
}

/// Split off the literal `debug` argument. Returns whether it was present and
/// the remaining arguments for clap.
pub fn strip_debug_arg(mut args: Vec<String>) -> (bool, Vec<String>) {
    let debug = ClientConfig::debug_requested(&args);
    if debug {
        args.remove(1);
    }
    (debug, args)
}
