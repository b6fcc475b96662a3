//! Subscriber command handlers.

use billdesk_core::{
    Console, DEFAULT_PAGE_SIZE, RegisterUserRequest, Subscriber, UpdateBalanceRequest,
    check_page_size,
};
use tabled::Tabled;

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SubscriberRow {
    #[tabled(rename = "MSISDN")]
    msisdn: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "NIN")]
    nin: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl SubscriberRow {
    fn new(s: &Subscriber, color: bool) -> Self {
        Self {
            msisdn: s.msisdn.to_string(),
            name: s.name.clone(),
            balance: output::balance_cell(s.balance, color),
            nin: s.nin.clone().unwrap_or_default(),
            active: if s.is_active { "yes" } else { "no" }.into(),
        }
    }
}

pub(super) fn detail(s: &Subscriber) -> String {
    output::detail_block(&[
        ("MSISDN", s.msisdn.to_string()),
        ("Name", s.name.clone()),
        ("Balance", format!("{:.2}", s.balance)),
        ("NIN", s.nin.clone().unwrap_or_default()),
        ("User ID", util::opt(s.user_id.as_ref())),
        ("Active", s.is_active.to_string()),
        ("SPN", s.spn.clone().unwrap_or_default()),
        ("IMSI", s.imsi.clone().unwrap_or_default()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        UsersCommand::List {
            page,
            page_size,
            all,
        } => {
            let page_size = check_page_size(page_size.unwrap_or(DEFAULT_PAGE_SIZE))?;
            if all {
                let users = console.all_users().await?;
                let out = output::render_list(
                    &global.output,
                    users.as_slice(),
                    |s| SubscriberRow::new(s, color),
                    |s| s.msisdn.to_string(),
                )?;
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
            let page = console.page_of_users(index, page_size).await?;
            let out = output::render_list(
                &global.output,
                &page.rows,
                |s| SubscriberRow::new(s, color),
                |s| s.msisdn.to_string(),
            )?;
            output::print_output(&out, global.quiet);

            if matches!(global.output, crate::cli::OutputFormat::Table) && !global.quiet {
                eprintln!(
                    "page {} of {} ({} subscribers)",
                    page.page + 1,
                    page.page_count.max(1),
                    page.total
                );
            }
            Ok(())
        }

        UsersCommand::Get { msisdn } => {
            let msisdn = util::msisdn("msisdn", &msisdn)?;
            let sub = console.subscriber(&msisdn).await?;
            let out = output::render_single(&global.output, sub.as_ref(), detail, |s| {
                s.msisdn.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Register { name, balance, nin } => {
            let req = RegisterUserRequest {
                name,
                balance: util::amount("balance", &balance)?,
                nin,
            };
            match console.register_user(req).await? {
                Some(sub) => {
                    let out = output::render_single(&global.output, &sub, detail, |s| {
                        s.msisdn.to_string()
                    })?;
                    output::print_output(&out, global.quiet);
                }
                None => output::print_success("Subscriber registered", color, global.quiet),
            }
            Ok(())
        }

        UsersCommand::Generate { count } => {
            let ack = console.generate_users(count).await?;
            output::print_success(
                &format!("Requested {count} generated subscribers"),
                color,
                global.quiet,
            );
            super::print_ack(&ack, global)
        }

        UsersCommand::SetBalance { msisdn, amount } => {
            let msisdn = util::msisdn("msisdn", &msisdn)?;
            let new_balance = util::amount("amount", &amount)?;
            if !util::confirm(
                &format!("Set the balance of {msisdn} to {new_balance:.2}?"),
                global.yes,
            )? {
                return Ok(());
            }

            let updated = console
                .update_balance(UpdateBalanceRequest {
                    msisdn: msisdn.clone(),
                    new_balance,
                })
                .await?;
            match updated {
                Some(sub) => {
                    let out = output::render_single(&global.output, &sub, detail, |s| {
                        format!("{:.2}", s.balance)
                    })?;
                    output::print_output(&out, global.quiet);
                }
                None => output::print_success(
                    &format!("Balance of {msisdn} set to {new_balance:.2}"),
                    color,
                    global.quiet,
                ),
            }
            Ok(())
        }
    }
}
