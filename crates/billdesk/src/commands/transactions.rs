//! Transaction command handlers.

use billdesk_core::{
    CallDuration, CallRequest, Console, ConsumeDataRequest, InternetRequest, SmsRequest,
    TransactionRecord, format_elapsed,
};
use tabled::Tabled;

use crate::cli::{GlobalOpts, TxArgs, TxCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    service: String,
    #[tabled(rename = "From")]
    sender: String,
    #[tabled(rename = "To")]
    receiver: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Time")]
    timestamp: String,
}

impl From<&TransactionRecord> for TransactionRow {
    fn from(t: &TransactionRecord) -> Self {
        Self {
            id: util::opt(t.id.as_ref()),
            service: util::opt(t.service_type.as_ref()),
            sender: util::opt(t.sender.as_ref()),
            receiver: util::opt(t.receiver.as_ref()),
            amount: t.amount.map(|a| format!("{a:.2}")).unwrap_or_default(),
            timestamp: t
                .timestamp
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

pub(super) fn detail(t: &TransactionRecord) -> String {
    let mut fields = vec![
        ("ID", util::opt(t.id.as_ref())),
        ("Type", util::opt(t.service_type.as_ref())),
        ("From", util::opt(t.sender.as_ref())),
        ("To", util::opt(t.receiver.as_ref())),
        ("Amount", t.amount.map(|a| format!("{a:.2}")).unwrap_or_default()),
        ("Time", t.timestamp.map(|ts| ts.to_rfc3339()).unwrap_or_default()),
    ];
    if !t.content.is_empty() {
        fields.push(("Content", t.content.clone()));
    }
    output::detail_block(&fields)
}

fn transaction_id(t: &TransactionRecord) -> String {
    util::opt(t.id.as_ref())
}

/// Print a settled transaction, or a confirmation when the backend sent none.
pub(super) fn print_transaction(
    tx: Option<&TransactionRecord>,
    fallback: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match tx {
        Some(tx) => {
            let out = output::render_single(&global.output, tx, detail, transaction_id)?;
            output::print_output(&out, global.quiet);
        }
        None => output::print_success(
            fallback,
            output::should_color(&global.color),
            global.quiet,
        ),
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: TxArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TxCommand::Sms { from, to, content } => {
            let req = SmsRequest {
                sender: util::msisdn("from", &from)?,
                receiver: util::msisdn("to", &to)?,
                content,
            };
            let tx = console.send_sms(req).await?;
            print_transaction(tx.as_ref(), "SMS sent", global)
        }

        TxCommand::Call { from, to, duration } => {
            let req = CallRequest {
                sender: util::msisdn("from", &from)?,
                receiver: util::msisdn("to", &to)?,
                duration_secs: duration,
            };
            let tx = console.place_call(req).await?;
            print_transaction(tx.as_ref(), "Call billed", global)
        }

        TxCommand::Internet { consumer, size } => {
            let req = InternetRequest {
                consumer: util::msisdn("consumer", &consumer)?,
                data_size_mb: size,
            };
            let tx = console.consume_internet(req).await?;
            print_transaction(tx.as_ref(), "Data usage billed", global)
        }

        TxCommand::ConsumeData { consumer } => {
            let req = ConsumeDataRequest {
                consumer: util::msisdn("consumer", &consumer)?,
            };
            let tx = console.consume_data(req).await?;
            print_transaction(tx.as_ref(), "Data usage billed", global)
        }

        TxCommand::Allowance { msisdn } => {
            let msisdn = util::msisdn("msisdn", &msisdn)?;
            let duration = console.call_duration(&msisdn).await?;
            let out = match duration.as_ref() {
                CallDuration::Seconds(secs) => output::render_single(
                    &global.output,
                    duration.as_ref(),
                    |_| {
                        output::detail_block(&[
                            ("MSISDN", msisdn.to_string()),
                            ("Seconds", format!("{secs:.0}")),
                            ("Talk time", format_elapsed(whole_seconds(*secs))),
                        ])
                    },
                    |_| format!("{secs:.0}"),
                )?,
                CallDuration::History(records) => output::render_list(
                    &global.output,
                    records,
                    |t| TransactionRow::from(t),
                    transaction_id,
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn whole_seconds(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    }
}
