use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tipstore_sdk::{EntityKind, TipStatus};

#[derive(Parser)]
#[command(
    name = "tipstore",
    about = "Tipstore: content-addressed storage for event tipping",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding blobs and the local index/cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./tipstore.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, read, update, and delete events
    Event(EventArgs),
    /// Manage speaker profiles
    Speaker(SpeakerArgs),
    /// Record tips and query tip histories
    Tip(TipArgs),
    /// Show index and cache statistics
    Stats,
    /// Print the public URL for a CID
    Url { cid: String },
    /// Print the effective configuration as TOML
    Config,
    /// Drop cached values of one kind (event, speaker, tip)
    ClearCache { kind: EntityKind },
}

#[derive(Args)]
pub struct EventArgs {
    #[command(subcommand)]
    pub action: EventAction,
}

#[derive(Subcommand)]
pub enum EventAction {
    Create {
        id: String,
        name: String,
        #[arg(long)]
        organizer: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Start time, milliseconds since the epoch
        #[arg(long)]
        start: Option<u64>,
        /// End time, milliseconds since the epoch
        #[arg(long)]
        end: Option<u64>,
        #[arg(long = "speaker")]
        speakers: Vec<String>,
    },
    Get {
        id: String,
    },
    List {
        /// Only events whose name, description or location match
        #[arg(short, long)]
        query: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        /// Replace the speaker list
        #[arg(long = "speaker")]
        speakers: Vec<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct SpeakerArgs {
    #[command(subcommand)]
    pub action: SpeakerAction,
}

#[derive(Subcommand)]
pub enum SpeakerAction {
    Create {
        id: String,
        name: String,
        #[arg(long)]
        wallet: String,
        #[arg(long, default_value = "")]
        bio: String,
    },
    Get {
        id: String,
    },
    /// List speakers, optionally filtered by name or bio
    Search {
        query: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Args)]
pub struct TipArgs {
    #[command(subcommand)]
    pub action: TipAction,
}

#[derive(Subcommand)]
pub enum TipAction {
    Add {
        event_id: String,
        #[arg(long)]
        speaker: String,
        #[arg(long)]
        tipper: String,
        /// Amount in the token's smallest unit
        #[arg(long)]
        amount: u128,
        #[arg(short, long)]
        message: Option<String>,
        /// Tip id; generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    History {
        event_id: String,
    },
    Status {
        event_id: String,
        tip_id: String,
        status: TipStatus,
        #[arg(long)]
        tx_hash: Option<String>,
    },
    /// Tips received by one speaker across all events
    Speaker {
        speaker_id: String,
    },
    Recent {
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    Stats {
        event_id: String,
    },
    /// Poll an event's tip history and print each update
    Watch {
        event_id: String,
        /// Stop after this many updates
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
}
