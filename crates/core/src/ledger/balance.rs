//! Outstanding balance aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{Direction, Entry};

/// Outstanding amounts grouped by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum still owed to the user.
    pub owed_to_user: Decimal,
    /// Sum the user still owes.
    pub owed_by_user: Decimal,
}

impl Totals {
    /// Adds one entry's outstanding amount to its direction, saturating at
    /// the `Decimal` bounds.
    pub fn add(&mut self, entry: &Entry) {
        let total = match entry.direction {
            Direction::OwedToUser => &mut self.owed_to_user,
            Direction::OwedByUser => &mut self.owed_by_user,
        };
        *total = total.saturating_add(entry.outstanding());
    }

    /// What the user is owed minus what the user owes.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.owed_to_user.saturating_sub(self.owed_by_user)
    }
}

impl<'a> FromIterator<&'a Entry> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a Entry>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut totals, entry| {
            totals.add(entry);
            totals
        })
    }
}

/// Sums `principal - paid_amount` per direction in one pass.
///
/// Status is not consulted: a settled entry contributes zero, an overpaid
/// one a negative amount. The result does not depend on entry order.
#[must_use]
pub fn totals(entries: &[Entry]) -> Totals {
    entries.iter().collect()
}
