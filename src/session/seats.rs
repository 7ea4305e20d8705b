use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::session::UserId;

/// Largest pool we can letter `A..=Z`
pub const MAX_SEATS: usize = 26;

/// A classroom seat, identified by a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat(char);

impl Seat {
    fn at(index: usize) -> Self {
        Seat((b'A' + index as u8) as char)
    }

    pub fn letter(&self) -> char {
        self.0
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed pool of seats handed out lowest-letter first
///
/// A seat maps to at most one user and a user holds at most one seat.
#[derive(Debug)]
pub struct SeatAllocator {
    seats: Vec<Seat>,
    columns: usize,
    assignments: HashMap<UserId, Seat>,
}

impl SeatAllocator {
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        let total = rows * columns;
        if total == 0 || total > MAX_SEATS {
            bail!(
                "Seat layout {}x{} must hold between 1 and {} seats",
                rows,
                columns,
                MAX_SEATS
            );
        }

        Ok(Self {
            seats: (0..total).map(Seat::at).collect(),
            columns,
            assignments: HashMap::new(),
        })
    }

    /// Seat the user in the lowest free seat, or `None` when the pool is full.
    /// A user who already holds a seat keeps it.
    pub fn assign(&mut self, user_id: UserId) -> Option<Seat> {
        if let Some(seat) = self.assignments.get(&user_id) {
            return Some(*seat);
        }

        let seat = self
            .seats
            .iter()
            .copied()
            .find(|seat| self.occupant(*seat).is_none())?;
        self.assignments.insert(user_id, seat);
        Some(seat)
    }

    /// Free the user's seat; releasing an unseated user is a no-op
    pub fn release(&mut self, user_id: UserId) -> Option<Seat> {
        self.assignments.remove(&user_id)
    }

    pub fn seat_of(&self, user_id: UserId) -> Option<Seat> {
        self.assignments.get(&user_id).copied()
    }

    pub fn occupant(&self, seat: Seat) -> Option<UserId> {
        self.assignments
            .iter()
            .find(|(_, s)| **s == seat)
            .map(|(user_id, _)| *user_id)
    }

    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    pub fn occupied(&self) -> usize {
        self.assignments.len()
    }

    /// Snapshot of the grid for display. `label` names each occupant.
    pub fn snapshot(&self, label: impl Fn(UserId) -> String) -> SeatMap {
        let cells = self
            .seats
            .iter()
            .map(|seat| SeatCell {
                seat: *seat,
                occupant: self.occupant(*seat).map(&label),
            })
            .collect();

        SeatMap {
            columns: self.columns,
            cells,
        }
    }
}

/// Point-in-time view of seat occupancy, in seat order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMap {
    pub columns: usize,
    pub cells: Vec<SeatCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCell {
    pub seat: Seat,
    pub occupant: Option<String>,
}

impl SeatMap {
    /// Text grid of the classroom, see [`crate::display::render_seat_map`]
    pub fn render(&self) -> String {
        crate::display::render_seat_map(self)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[SeatCell]> {
        self.cells.chunks(self.columns.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_lowest_free_seat() {
        let mut seats = SeatAllocator::new(3, 3).unwrap();

        assert_eq!(seats.assign(10), Some(Seat('A')));
        assert_eq!(seats.assign(11), Some(Seat('B')));
        assert_eq!(seats.assign(12), Some(Seat('C')));

        // Releasing B makes it the lowest free seat again
        assert_eq!(seats.release(11), Some(Seat('B')));
        assert_eq!(seats.assign(13), Some(Seat('B')));
        assert_eq!(seats.assign(14), Some(Seat('D')));
    }

    #[test]
    fn test_assign_is_stable_for_seated_user() {
        let mut seats = SeatAllocator::new(3, 3).unwrap();

        assert_eq!(seats.assign(1), Some(Seat('A')));
        assert_eq!(seats.assign(1), Some(Seat('A')));
        assert_eq!(seats.occupied(), 1);
    }

    #[test]
    fn test_exhausted_pool_returns_none() {
        let mut seats = SeatAllocator::new(3, 3).unwrap();
        for user in 0..9 {
            assert!(seats.assign(user).is_some());
        }

        assert_eq!(seats.assign(99), None);
        assert_eq!(seats.seat_of(99), None);
        assert_eq!(seats.occupied(), 9);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut seats = SeatAllocator::new(1, 2).unwrap();
        seats.assign(5);

        assert_eq!(seats.release(5), Some(Seat('A')));
        assert_eq!(seats.release(5), None);
        assert_eq!(seats.release(6), None);
        assert_eq!(seats.occupant(Seat('A')), None);
    }

    #[test]
    fn test_invalid_layouts_rejected() {
        assert!(SeatAllocator::new(0, 3).is_err());
        assert!(SeatAllocator::new(3, 9).is_err());
        assert_eq!(SeatAllocator::new(2, 13).unwrap().capacity(), 26);
    }

    #[test]
    fn test_snapshot_labels_occupants_in_seat_order() {
        let mut seats = SeatAllocator::new(2, 2).unwrap();
        seats.assign(7);
        seats.assign(8);
        seats.release(7);

        let map = seats.snapshot(|user_id| format!("u{}", user_id));
        let occupants: Vec<_> = map.cells.iter().map(|c| c.occupant.clone()).collect();
        assert_eq!(occupants, vec![None, Some("u8".to_string()), None, None]);
        assert_eq!(map.rows().count(), 2);
    }
}
