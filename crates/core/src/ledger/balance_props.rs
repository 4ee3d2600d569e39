//! Property-based tests for entry settlement and totals.
//!
//! - Status is `Paid` exactly when cumulative payments reach the principal.
//! - Totals do not depend on entry order.

use chrono::Utc;
use debtbook_shared::types::{EntryId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::totals;
use super::entry::{Direction, Entry, EntryStatus};

/// Strategy to generate a non-negative principal (0.00 to 10,000.00).
fn principal() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a positive payment (0.01 to 5,000.00).
fn payment() -> impl Strategy<Value = Decimal> {
    (1i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::OwedToUser), Just(Direction::OwedByUser)]
}

fn open_entry(principal: Decimal, direction: Direction) -> Entry {
    Entry {
        id: EntryId::new(),
        owner: UserId::new(),
        counterparty: "Anna".to_string(),
        principal,
        paid_amount: Decimal::ZERO,
        direction,
        status: EntryStatus::Open,
        created_at: Utc::now(),
    }
}

/// Strategy to generate an entry with some payments applied.
fn entry() -> impl Strategy<Value = Entry> {
    (principal(), direction(), prop::collection::vec(payment(), 0..4)).prop_map(
        |(principal, direction, payments)| {
            payments
                .into_iter()
                .try_fold(open_entry(principal, direction), |e, p| e.with_payment(p))
                .expect("small payments never overflow")
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* principal and payment sequence, status is `Paid` iff
    /// cumulative paid >= principal, and paid never decreases.
    #[test]
    fn prop_status_tracks_cumulative_payments(
        principal in principal(),
        payments in prop::collection::vec(payment(), 0..10),
    ) {
        let mut entry = open_entry(principal, Direction::OwedToUser);
        let mut cumulative = Decimal::ZERO;

        for p in payments {
            let before = entry.paid_amount;
            entry = entry.with_payment(p).unwrap();
            cumulative += p;

            prop_assert!(entry.paid_amount > before);
            prop_assert_eq!(entry.paid_amount, cumulative);
            prop_assert_eq!(entry.principal, principal);
            prop_assert_eq!(entry.status == EntryStatus::Paid, cumulative >= principal);
        }
    }

    /// *For any* entry, settling twice equals settling once.
    #[test]
    fn prop_settle_idempotent(entry in entry()) {
        let once = entry.settled();
        prop_assert_eq!(once.settled(), once.clone());
        prop_assert!(once.is_paid());
        prop_assert!(once.outstanding() <= Decimal::ZERO);
    }

    /// *For any* entry list, reversing or rotating it leaves totals unchanged.
    #[test]
    fn prop_totals_order_independent(
        entries in prop::collection::vec(entry(), 0..20),
        rotate_by in 0usize..20,
    ) {
        let expected = totals(&entries);

        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert_eq!(totals(&reversed), expected);

        let mut rotated = entries.clone();
        if !rotated.is_empty() {
            let len = rotated.len();
            rotated.rotate_left(rotate_by % len);
        }
        prop_assert_eq!(totals(&rotated), expected);
    }

    /// *For any* entry list, each direction's total is the sum of that
    /// direction's outstanding amounts.
    #[test]
    fn prop_totals_split_by_direction(entries in prop::collection::vec(entry(), 0..20)) {
        let result = totals(&entries);
        let to_user: Decimal = entries
            .iter()
            .filter(|e| e.direction == Direction::OwedToUser)
            .map(Entry::outstanding)
            .sum();
        let by_user: Decimal = entries
            .iter()
            .filter(|e| e.direction == Direction::OwedByUser)
            .map(Entry::outstanding)
            .sum();

        prop_assert_eq!(result.owed_to_user, to_user);
        prop_assert_eq!(result.owed_by_user, by_user);
    }
}
