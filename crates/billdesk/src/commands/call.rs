//! Live call handler: start the clock, wait for a hang-up, bill the call.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use billdesk_core::{CallSession, Console, format_elapsed};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::oneshot;
use tracing::debug;

use crate::cli::{CallArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{transactions, util};

/// Why the call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hangup {
    Enter,
    Interrupt,
    Limit,
}

pub async fn handle(console: &Console, args: CallArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let caller = util::msisdn("caller", &args.caller)?;
    let callee = util::msisdn("callee", &args.callee)?;

    let mut session = console.begin_call(caller, callee).await?;
    session.start()?;

    let spinner = spinner(global);
    let reason = wait_for_hangup(
        &session,
        &spinner,
        args.max_secs,
        tokio::signal::ctrl_c(),
        enter_pressed(),
    )
    .await;
    let summary = session.end()?;
    spinner.finish_and_clear();
    debug!(?reason, elapsed = summary.elapsed_secs, "call ended");

    let talk_time = format_elapsed(summary.elapsed_secs);
    if summary.elapsed_secs == 0 {
        output::print_success(
            &format!("Call ended after {talk_time}, nothing billed"),
            output::should_color(&global.color),
            global.quiet,
        );
        return Ok(());
    }

    let tx = console.settle_call(&summary).await?;
    transactions::print_transaction(
        tx.as_ref(),
        &format!("Call of {talk_time} billed to {}", summary.caller),
        global,
    )
}

/// Follow the clock until Enter, `interrupt`, or the optional time limit.
///
/// End of input on stdin only disables the Enter hang-up.
async fn wait_for_hangup(
    session: &CallSession,
    spinner: &ProgressBar,
    max_secs: Option<u64>,
    interrupt: impl Future<Output = std::io::Result<()>>,
    mut enter: oneshot::Receiver<bool>,
) -> Hangup {
    let mut clock = session.subscribe();
    let label = format!("{} → {}", session.caller(), session.callee());
    spinner.set_message(format!("{label}  {}", format_elapsed(0)));

    let mut stdin_open = true;
    tokio::pin!(interrupt);

    let limit = async {
        match max_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(limit);

    loop {
        tokio::select! {
            biased;
            _ = &mut interrupt => return Hangup::Interrupt,
            () = &mut limit => return Hangup::Limit,
            pressed = &mut enter, if stdin_open => {
                if matches!(pressed, Ok(true)) {
                    return Hangup::Enter;
                }
                stdin_open = false;
            }
            changed = clock.changed() => {
                if changed.is_err() {
                    return Hangup::Interrupt;
                }
                let elapsed = clock.borrow_and_update().elapsed_secs;
                spinner.set_message(format!("{label}  {}", format_elapsed(elapsed)));
            }
        }
    }
}

/// Resolves `true` once a line is read, `false` on end of input.
///
/// Reads on a detached thread so a pending read never holds up exit.
fn enter_pressed() -> oneshot::Receiver<bool> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let read = std::io::stdin().read_line(&mut line);
        let _ = tx.send(matches!(read, Ok(n) if n > 0));
    });
    rx
}

fn spinner(global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}  (Enter to hang up)")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use billdesk_core::Msisdn;

    fn started() -> CallSession {
        let mut session = CallSession::new(
            Msisdn::parse("0700000001").unwrap(),
            Msisdn::parse("0700000002").unwrap(),
        );
        session.start().unwrap();
        session
    }

    fn never() -> std::future::Pending<std::io::Result<()>> {
        std::future::pending()
    }

    #[tokio::test(start_paused = true)]
    async fn time_limit_hangs_up() {
        let session = started();
        let (_stdin, enter) = oneshot::channel();
        let reason =
            wait_for_hangup(&session, &ProgressBar::hidden(), Some(2), never(), enter).await;
        assert_eq!(reason, Hangup::Limit);
        assert!(session.elapsed_secs() <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_hangs_up() {
        let session = started();
        let (stdin, enter) = oneshot::channel();
        stdin.send(true).unwrap();
        let reason = wait_for_hangup(&session, &ProgressBar::hidden(), None, never(), enter).await;
        assert_eq!(reason, Hangup::Enter);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_stdin_keeps_the_call_running() {
        let session = started();
        let (stdin, enter) = oneshot::channel();
        stdin.send(false).unwrap();
        let reason =
            wait_for_hangup(&session, &ProgressBar::hidden(), Some(3), never(), enter).await;
        assert_eq!(reason, Hangup::Limit);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_armed_once_survives_clock_ticks() {
        let session = started();
        let (_stdin, enter) = oneshot::channel();
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            Ok(())
        };
        let reason =
            wait_for_hangup(&session, &ProgressBar::hidden(), None, interrupt, enter).await;
        assert_eq!(reason, Hangup::Interrupt);
        assert_eq!(session.elapsed_secs(), 2);
    }
}
