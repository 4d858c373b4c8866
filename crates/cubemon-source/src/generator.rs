//! Synthetic transaction generation

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SourceError;
use crate::types::{Location, Transaction, TransactionStatus, TransactionType};

/// Operators that appear as the acting user
pub const USERNAMES: [&str; 6] = [
    "John Doe",
    "Jane Smith",
    "Mike Johnson",
    "Sarah Williams",
    "David Brown",
    "Emma Davis",
];

/// Robots are numbered `ROBOT-1` through `ROBOT-20`
pub const ROBOT_COUNT: u32 = 20;

/// Uniform timestamp in `[start, end]`
fn random_between<R: Rng + ?Sized>(rng: &mut R, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    let span = (end - start).num_milliseconds().max(0);
    start + Duration::milliseconds(rng.gen_range(0..=span))
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    // Callers only pass the non-empty constant tables above
    *items.choose(rng).unwrap_or(&items[0])
}

/// Generate `count` records created within `days_back` days before `now`,
/// sorted by creation time, newest first.
pub fn generate_transactions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    days_back: u32,
    now: DateTime<Utc>,
) -> Result<Vec<Transaction>, SourceError> {
    if days_back == 0 {
        return Err(SourceError::InvalidSetting {
            field: "days_back".to_string(),
            message: "window must span at least one day".to_string(),
        });
    }

    let window_start = now - Duration::days(i64::from(days_back));
    let mut transactions = Vec::with_capacity(count);

    for i in 0..count {
        let created_at = random_between(rng, window_start, now);
        let updated_at = random_between(rng, created_at, now);

        transactions.push(Transaction {
            id: format!("TXN-{:06}", i + 1),
            item_id: format!("ITEM-{}", rng.gen_range(0..10000)),
            tray_id: format!("TRAY-{}", rng.gen_range(0..1000)),
            created_at,
            updated_at,
            quantity: rng.gen_range(1..=50),
            username: pick(rng, &USERNAMES).to_string(),
            transaction_type: pick(rng, &TransactionType::ALL),
            robot_id: format!("ROBOT-{}", rng.gen_range(1..=ROBOT_COUNT)),
            location_name: pick(rng, &Location::ALL),
            status: pick(rng, &TransactionStatus::ALL),
        });
    }

    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_generates_requested_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let txs = generate_transactions(&mut rng, 300, 30, now()).unwrap();
        assert_eq!(txs.len(), 300);
    }

    #[test]
    fn test_ids_are_unique_and_padded() {
        let mut rng = StdRng::seed_from_u64(2);
        let txs = generate_transactions(&mut rng, 50, 30, now()).unwrap();
        let ids: HashSet<_> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.contains("TXN-000001"));
        assert!(ids.contains("TXN-000050"));
    }

    #[test]
    fn test_sorted_newest_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let txs = generate_transactions(&mut rng, 100, 30, now()).unwrap();
        assert!(txs.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_field_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        let start = now() - Duration::days(30);
        let txs = generate_transactions(&mut rng, 200, 30, now()).unwrap();
        for tx in &txs {
            assert!(tx.created_at >= start && tx.created_at <= now());
            assert!(tx.updated_at >= tx.created_at && tx.updated_at <= now());
            assert!((1..=50).contains(&tx.quantity));
            assert!(USERNAMES.contains(&tx.username.as_str()));
            let robot: u32 = tx.robot_id.trim_start_matches("ROBOT-").parse().unwrap();
            assert!((1..=ROBOT_COUNT).contains(&robot));
            let item: u32 = tx.item_id.trim_start_matches("ITEM-").parse().unwrap();
            assert!(item < 10000);
            let tray: u32 = tx.tray_id.trim_start_matches("TRAY-").parse().unwrap();
            assert!(tray < 1000);
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = generate_transactions(&mut StdRng::seed_from_u64(9), 20, 30, now()).unwrap();
        let b = generate_transactions(&mut StdRng::seed_from_u64(9), 20, 30, now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(generate_transactions(&mut rng, 10, 0, now()).is_err());
    }
}
