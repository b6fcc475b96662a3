// ── Dashboard aggregates and pagination ──

use serde::Serialize;

use crate::error::CoreError;
use crate::model::Subscriber;

/// Page sizes offered to operators.
pub const PAGE_SIZES: [usize; 3] = [5, 10, 25];
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Accept only one of the offered `PAGE_SIZES`.
pub fn check_page_size(size: usize) -> Result<usize, CoreError> {
    if PAGE_SIZES.contains(&size) {
        return Ok(size);
    }
    let [small, medium, large] = PAGE_SIZES;
    Err(CoreError::invalid(
        "page_size",
        format!("must be {small}, {medium}, or {large}"),
    ))
}

const TOP_SUBSCRIBERS: usize = 5;

/// Balance range with inclusive upper bound; `max: None` is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceBucket {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
    pub count: usize,
}

const BUCKETS: [(&str, f64, Option<f64>); 4] = [
    ("0-1000", 0.0, Some(1000.0)),
    ("1001-5000", 1000.0, Some(5000.0)),
    ("5001-10000", 5000.0, Some(10000.0)),
    ("10001+", 10000.0, None),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_balance: f64,
    pub average_balance: f64,
    pub top_by_balance: Vec<Subscriber>,
    pub distribution: Vec<BalanceBucket>,
}

impl DashboardStats {
    pub fn from_subscribers(subscribers: &[Subscriber]) -> Self {
        let total_users = subscribers.len();
        let total_balance: f64 = subscribers.iter().map(|s| s.balance).sum();
        let average_balance = if total_users == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = total_users as f64;
            total_balance / n
        };

        let mut top_by_balance = subscribers.to_vec();
        top_by_balance.sort_by(|a, b| b.balance.total_cmp(&a.balance));
        top_by_balance.truncate(TOP_SUBSCRIBERS);

        let distribution = BUCKETS
            .iter()
            .enumerate()
            .map(|(i, &(label, min, max))| BalanceBucket {
                label,
                min,
                max,
                count: subscribers
                    .iter()
                    .filter(|s| bucket_index(s.balance) == i)
                    .count(),
            })
            .collect();

        Self {
            total_users,
            total_balance,
            average_balance,
            top_by_balance,
            distribution,
        }
    }
}

/// Negative balances fall into the first bucket.
fn bucket_index(balance: f64) -> usize {
    BUCKETS
        .iter()
        .position(|&(_, _, max)| max.is_none_or(|max| balance <= max))
        .unwrap_or(BUCKETS.len() - 1)
}

// ── Pagination ──────────────────────────────────────────────────────

/// One zero-based page of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub page_count: usize,
}

/// Slice `items` into page `page` (zero-based). A page past the end is
/// empty but still reports the total. A zero page size is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size);
    let rows = items
        .iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    Page {
        rows,
        page,
        page_size,
        total,
        page_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Msisdn;
    use pretty_assertions::assert_eq;

    fn sub(msisdn: &str, balance: f64) -> Subscriber {
        Subscriber {
            msisdn: Msisdn::from_backend(msisdn.into()),
            user_id: None,
            name: format!("user-{msisdn}"),
            balance,
            nin: None,
            is_active: true,
            spn: None,
            imsi: None,
        }
    }

    #[test]
    fn empty_list_has_zero_average() {
        let stats = DashboardStats::from_subscribers(&[]);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.average_balance, 0.0);
        assert!(stats.top_by_balance.is_empty());
        assert!(stats.distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn totals_and_top_five() {
        let subs: Vec<_> = (1..=7).map(|i| sub(&i.to_string(), f64::from(i) * 100.0)).collect();
        let stats = DashboardStats::from_subscribers(&subs);

        assert_eq!(stats.total_users, 7);
        assert_eq!(stats.total_balance, 2800.0);
        assert_eq!(stats.average_balance, 400.0);

        let top: Vec<&str> = stats.top_by_balance.iter().map(|s| s.msisdn.as_str()).collect();
        assert_eq!(top, ["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn bucket_bounds_are_inclusive() {
        let subs = [
            sub("a", 0.0),
            sub("b", 1000.0),
            sub("c", 1000.5),
            sub("d", 5000.0),
            sub("e", 10000.0),
            sub("f", 10000.01),
        ];
        let counts: Vec<usize> = DashboardStats::from_subscribers(&subs)
            .distribution
            .iter()
            .map(|b| b.count)
            .collect();
        assert_eq!(counts, [2, 2, 1, 1]);
    }

    #[test]
    fn three_rows_two_per_page() {
        let items = ["a", "b", "c"];

        let first = paginate(&items, 0, 2);
        assert_eq!(first.rows, ["a", "b"]);
        assert_eq!(first.total, 3);
        assert_eq!(first.page_count, 2);

        let second = paginate(&items, 1, 2);
        assert_eq!(second.rows, ["c"]);
    }

    #[test]
    fn only_offered_page_sizes_pass() {
        for size in PAGE_SIZES {
            assert_eq!(check_page_size(size).unwrap(), size);
        }
        assert!(PAGE_SIZES.contains(&DEFAULT_PAGE_SIZE));

        let err = check_page_size(7).unwrap_err();
        assert_eq!(err, CoreError::invalid("page_size", "must be 5, 10, or 25"));
        assert!(check_page_size(0).is_err());
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = paginate(&[1, 2, 3], 9, 5);
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page_count, 1);
    }
}
