//! Clap derive structures for the `billdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// billdesk -- operator console for the telecom billing backend
#[derive(Debug, Parser)]
#[command(
    name = "billdesk",
    version,
    about = "Operate the telecom billing backend from the command line",
    long_about = "Register subscribers, inspect balances, run SMS, voice and data\n\
        transactions, time live calls, and set package prices against the\n\
        traditional billing backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "BILLDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'S', env = "BILLDESK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BILLDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BILLDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BILLDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage subscribers
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Run billable transactions
    #[command(alias = "transactions")]
    Tx(TxArgs),

    /// Time a live voice call and bill it when it ends
    Call(CallArgs),

    /// Set package prices
    #[command(alias = "pkg")]
    Packages(PackagesArgs),

    /// Show subscriber and balance aggregates
    #[command(alias = "dash")]
    Dashboard,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List subscribers, one page at a time
    #[command(alias = "ls")]
    List {
        /// Page number (starting at 1)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Rows per page: 5, 10 or 25 [default: 5]
        #[arg(long)]
        page_size: Option<usize>,

        /// Print every subscriber instead of one page
        #[arg(long, conflicts_with_all = ["page", "page_size"])]
        all: bool,
    },

    /// Show one subscriber
    Get {
        /// Subscriber MSISDN
        msisdn: String,
    },

    /// Register a new subscriber
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Opening balance
        #[arg(long, allow_hyphen_values = true)]
        balance: String,

        /// National identity number
        #[arg(long)]
        nin: String,
    },

    /// Ask the backend to create random subscribers
    Generate {
        /// How many subscribers to create
        count: u32,
    },

    /// Overwrite a subscriber's balance
    SetBalance {
        /// Subscriber MSISDN
        msisdn: String,

        /// New balance
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

// ── Transactions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Debug, Subcommand)]
pub enum TxCommand {
    /// Send an SMS
    Sms {
        /// Sender MSISDN
        #[arg(long)]
        from: String,

        /// Receiver MSISDN
        #[arg(long)]
        to: String,

        /// Message body
        #[arg(long)]
        content: String,
    },

    /// Bill a voice call of a fixed duration
    Call {
        /// Caller MSISDN
        #[arg(long)]
        from: String,

        /// Callee MSISDN
        #[arg(long)]
        to: String,

        /// Duration in seconds
        #[arg(long)]
        duration: u64,
    },

    /// Consume mobile data
    Internet {
        /// Consumer MSISDN
        #[arg(long)]
        consumer: String,

        /// Data size in MB
        #[arg(long)]
        size: u64,
    },

    /// Consume data through the backend's default bundle
    ConsumeData {
        /// Consumer MSISDN
        #[arg(long)]
        consumer: String,
    },

    /// Look up how many call seconds a subscriber has
    Allowance {
        /// Subscriber MSISDN
        msisdn: String,
    },
}

// ── Live call ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Caller MSISDN
    pub caller: String,

    /// Callee MSISDN
    pub callee: String,

    /// Hang up automatically after this many seconds
    #[arg(long)]
    pub max_secs: Option<u64>,
}

// ── Packages ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PackagesArgs {
    #[command(subcommand)]
    pub command: PackagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PackagesCommand {
    /// Set the unit price of a service class
    Set {
        /// Service class
        class: PackageKind,

        /// New price
        #[arg(allow_hyphen_values = true)]
        price: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PackageKind {
    Internet,
    Voice,
    Sms,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: server, timeout, stale_secs, min_call_balance, insecure, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
