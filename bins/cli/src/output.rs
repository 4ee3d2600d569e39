//! Plain-text rendering of entries and totals.

use std::fmt::Write as _;

use debtbook_core::ledger::{Direction, Entry, EntryStatus, Totals};

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::OwedToUser => "owes you",
        Direction::OwedByUser => "you owe",
    }
}

/// One line per entry.
pub fn entry_line(entry: &Entry) -> String {
    let status = match entry.status {
        EntryStatus::Open => "open",
        EntryStatus::Paid => "paid",
    };
    format!(
        "{id}  {date}  {name} {label} {outstanding} (of {principal}, {status})",
        id = entry.id,
        date = entry.created_at.format("%Y-%m-%d"),
        name = entry.counterparty,
        label = direction_label(entry.direction),
        outstanding = entry.outstanding(),
        principal = entry.principal,
    )
}

/// Totals block.
pub fn totals_block(totals: &Totals) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Owed to you: {}", totals.owed_to_user);
    let _ = writeln!(out, "You owe:     {}", totals.owed_by_user);
    let _ = write!(out, "Net:         {}", totals.net());
    out
}

/// Entries followed by totals.
pub fn ledger(entries: &[Entry], totals: &Totals) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("No entries yet.\n");
    }
    for entry in entries {
        out.push_str(&entry_line(entry));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&totals_block(totals));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use debtbook_shared::types::{EntryId, UserId};
    use rust_decimal_macros::dec;

    fn entry() -> Entry {
        Entry {
            id: EntryId::new(),
            owner: UserId::new(),
            counterparty: "Anna".to_string(),
            principal: dec!(100),
            paid_amount: dec!(40),
            direction: Direction::OwedToUser,
            status: EntryStatus::Open,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_entry_line() {
        let entry = entry();
        assert_eq!(
            entry_line(&entry),
            format!("{}  2026-03-01  Anna owes you 60 (of 100, open)", entry.id)
        );
    }

    #[test]
    fn test_ledger_lists_then_totals() {
        let entry = entry();
        let totals = Totals::from_iter([&entry]);
        let rendered = ledger(&[entry], &totals);

        assert!(rendered.contains("Anna owes you 60"));
        assert!(rendered.ends_with("Net:         60"));
    }

    #[test]
    fn test_empty_ledger() {
        let rendered = ledger(&[], &Totals::default());
        assert!(rendered.starts_with("No entries yet."));
        assert!(rendered.contains("Owed to you: 0"));
    }
}
