//! Command dispatch: routes each CLI subcommand to its handler.

pub mod call;
pub mod config_cmd;
pub mod dashboard;
pub mod packages;
pub mod transactions;
pub mod users;
pub mod util;

use billdesk_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Route a backend command to its handler.
pub async fn dispatch(cmd: Command, console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Users(args) => users::handle(console, args, global).await,
        Command::Tx(args) => transactions::handle(console, args, global).await,
        Command::Call(args) => call::handle(console, args, global).await,
        Command::Packages(args) => packages::handle(console, args, global).await,
        Command::Dashboard => dashboard::handle(console, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a backend".into(),
        )),
    }
}

/// Print the backend's free-form acknowledgement, if it sent one.
fn print_ack(ack: &serde_json::Value, global: &GlobalOpts) -> Result<(), CliError> {
    let body = match ack {
        serde_json::Value::Null => return Ok(()),
        serde_json::Value::String(s) if s.trim().is_empty() => return Ok(()),
        other => other,
    };
    let out = output::render_single(
        &global.output,
        body,
        |v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        },
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
