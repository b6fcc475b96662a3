//! Subscriber dashboard: totals, top balances, and the balance spread.

use billdesk_core::{BalanceBucket, Console, DashboardStats, Subscriber};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TopRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "MSISDN")]
    msisdn: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Balance range")]
    range: &'static str,
    #[tabled(rename = "Subscribers")]
    count: usize,
    #[tabled(rename = "")]
    bar: String,
}

fn top_rows(top: &[Subscriber]) -> Vec<TopRow> {
    top.iter()
        .enumerate()
        .map(|(i, s)| TopRow {
            rank: i + 1,
            msisdn: s.msisdn.to_string(),
            name: s.name.clone(),
            balance: format!("{:.2}", s.balance),
        })
        .collect()
}

/// Bars scaled to the largest bucket, at most 30 cells wide.
fn bucket_rows(buckets: &[BalanceBucket]) -> Vec<BucketRow> {
    const WIDTH: usize = 30;
    let peak = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    buckets
        .iter()
        .map(|b| BucketRow {
            range: b.label,
            count: b.count,
            bar: "█".repeat((b.count * WIDTH).div_ceil(peak).min(WIDTH)),
        })
        .collect()
}

fn render_dashboard(stats: &DashboardStats) -> String {
    let summary = output::detail_block(&[
        ("Subscribers", stats.total_users.to_string()),
        ("Total balance", format!("{:.2}", stats.total_balance)),
        ("Average balance", format!("{:.2}", stats.average_balance)),
    ]);
    let top = Table::new(top_rows(&stats.top_by_balance))
        .with(Style::rounded())
        .to_string();
    let spread = Table::new(bucket_rows(&stats.distribution))
        .with(Style::rounded())
        .to_string();
    format!("{summary}\n\nTop balances\n{top}\n\nBalance distribution\n{spread}")
}

pub async fn handle(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = console.dashboard().await?;
    let out = output::render_single(&global.output, &stats, render_dashboard, |s| {
        s.total_users.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(label: &'static str, count: usize) -> BalanceBucket {
        BalanceBucket {
            label,
            min: 0.0,
            max: None,
            count,
        }
    }

    #[test]
    fn bars_scale_to_the_largest_bucket() {
        let rows = bucket_rows(&[bucket("a", 10), bucket("b", 5), bucket("c", 0)]);
        assert_eq!(rows[0].bar.chars().count(), 30);
        assert_eq!(rows[1].bar.chars().count(), 15);
        assert!(rows[2].bar.is_empty());
    }

    #[test]
    fn empty_dashboard_renders() {
        let text = render_dashboard(&DashboardStats::from_subscribers(&[]));
        assert!(text.contains("Subscribers"));
        assert!(text.contains("0.00"));
    }
}
