//! Order placement
//!
//! Every ticket is range-checked before the transaction opens. Inside it
//! the order row is written first, then each ticket after its seat is
//! claimed against the flight's current seat map. The unique
//! `(row, seat, flight_id)` index catches anything that slips between the
//! read and the insert under concurrent bookings.

use super::seat_map::{validate_ticket, Seat, SeatMap};
use crate::db::inputs::{OrderInput, TicketInput};
use crate::db::models::*;
use crate::db::{OrderRecord, Repository};
use crate::errors::{AppError, Result};
use crate::metrics::{record_order, record_seat_conflict};
use crate::timestamp;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};
use validator::Validate;

/// Create an order for `user_id` with every requested ticket, or nothing
pub async fn place_order(repo: &Repository, user_id: i32, input: OrderInput) -> Result<OrderRecord> {
    let started = Instant::now();
    input.validate()?;

    let airplanes = repo
        .airplanes_for_flights(input.tickets.iter().map(|t| t.flight))
        .await?;

    for ticket in &input.tickets {
        let airplane = airplanes.get(&ticket.flight).ok_or_else(|| {
            AppError::field(
                "flight",
                format!("Invalid pk \"{}\" - object does not exist.", ticket.flight),
            )
        })?;
        validate_ticket(ticket.row, ticket.seat, airplane)?;
    }

    let tickets = input.tickets;
    let ticket_count = tickets.len();

    let result = repo
        .pool()
        .atomic(move |txn| {
            Box::pin(async move {
                let order = OrderActiveModel {
                    user_id: Set(user_id),
                    created_at: Set(timestamp::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut seat_maps: HashMap<i32, SeatMap> = HashMap::new();

                for request in &tickets {
                    let seat_map = match seat_maps.entry(request.flight) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            let airplane = airplanes.get(&request.flight).ok_or_else(|| {
                                AppError::not_found("Flight", request.flight)
                            })?;
                            let sold = TicketEntity::find()
                                .filter(TicketColumn::FlightId.eq(request.flight))
                                .all(txn)
                                .await?;
                            entry.insert(SeatMap::new(airplane, &sold))
                        }
                    };

                    if !seat_map.claim(Seat { row: request.row, seat: request.seat }) {
                        return Err(seat_taken(request));
                    }

                    insert_ticket(txn, order.id, request).await?;
                }

                Ok(order.id)
            })
        })
        .await;

    let order_id = match result {
        Ok(order_id) => order_id,
        Err(err) => {
            if let AppError::SeatTaken { row, seat, flight_id } = &err {
                record_seat_conflict();
                debug!(user_id, flight_id, row, seat, "Order rolled back, seat taken");
            }
            return Err(err);
        }
    };

    record_order(started.elapsed(), ticket_count);
    info!(order_id, user_id, tickets = ticket_count, "Order placed");

    repo.order(order_id, Some(user_id), false).await
}

/// Write one ticket. A unique-index violation means another order got
/// the seat after our seat map was read.
async fn insert_ticket<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    request: &TicketInput,
) -> Result<Ticket> {
    TicketActiveModel {
        row: Set(request.row),
        seat: Set(request.seat),
        flight_id: Set(request.flight),
        order_id: Set(order_id),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict { .. } => seat_taken(request),
        other => other,
    })
}

fn seat_taken(request: &TicketInput) -> AppError {
    AppError::SeatTaken {
        row: request.row,
        seat: request.seat,
        flight_id: request.flight,
    }
}
