use crate::db::models::{Airplane, Ticket};
use crate::errors::{AppError, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// A seat coordinate, 1-based in both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Seat {
    pub row: i32,
    pub seat: i32,
}

impl From<&Ticket> for Seat {
    fn from(ticket: &Ticket) -> Self {
        Seat {
            row: ticket.row,
            seat: ticket.seat,
        }
    }
}

/// Check that `(row, seat)` exists on `airplane`.
///
/// The error is keyed by the offending ticket field.
pub fn validate_ticket(row: i32, seat: i32, airplane: &Airplane) -> Result<()> {
    let checks = [
        (row, "row", "rows", airplane.rows),
        (seat, "seat", "seats_in_row", airplane.seats_in_row),
    ];

    for (value, field, airplane_field, count) in checks {
        if !(1..=count).contains(&value) {
            return Err(AppError::field(
                field,
                format!(
                    "{} number must be in available range: (1, {}): (1, {})",
                    field, airplane_field, count
                ),
            ));
        }
    }

    Ok(())
}

/// Legal seats of one flight's airplane and the ones already sold
#[derive(Debug, Clone)]
pub struct SeatMap {
    rows: i32,
    seats_in_row: i32,
    taken: BTreeSet<Seat>,
}

impl SeatMap {
    pub fn new<'a>(airplane: &Airplane, tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        Self {
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            taken: tickets.into_iter().map(Seat::from).collect(),
        }
    }

    /// Whether the coordinate exists on the airplane
    pub fn contains(&self, seat: Seat) -> bool {
        (1..=self.rows).contains(&seat.row) && (1..=self.seats_in_row).contains(&seat.seat)
    }

    pub fn is_taken(&self, seat: Seat) -> bool {
        self.taken.contains(&seat)
    }

    /// Mark a seat as sold. Returns `false` if it does not exist or is taken.
    pub fn claim(&mut self, seat: Seat) -> bool {
        self.contains(seat) && self.taken.insert(seat)
    }

    /// Sold seats in row-major order
    pub fn taken(&self) -> impl Iterator<Item = Seat> + '_ {
        self.taken.iter().copied()
    }

    /// Seats still on sale
    pub fn available_count(&self) -> i64 {
        let capacity = i64::from(self.rows.max(0)) * i64::from(self.seats_in_row.max(0));
        let sold = self.taken.iter().filter(|s| self.contains(**s)).count() as i64;
        capacity - sold
    }
}
