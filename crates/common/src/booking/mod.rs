//! Seat allocation and order placement
//!
//! Provides:
//! - Range validation of a requested seat against an airplane
//! - `SeatMap`, the per-flight view of legal and taken seats
//! - `place_order`, the all-or-nothing order transaction

mod engine;
mod seat_map;

pub use engine::place_order;
pub use seat_map::{validate_ticket, Seat, SeatMap};
