//! Schema creation from the entity definitions
//!
//! Tables are created parents first so foreign keys always resolve.
//! Every statement is `IF NOT EXISTS`, so running this against an
//! existing database is a no-op.

use super::models::*;
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Schema};
use tracing::info;

/// Name of the unique index guarding seat allocation
pub const SEAT_INDEX: &str = "idx_tickets_row_seat_flight";

/// Create all tables and indexes
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = vec![
        schema.create_table_from_entity(CountryEntity),
        schema.create_table_from_entity(AirportEntity),
        schema.create_table_from_entity(RouteEntity),
        schema.create_table_from_entity(AirplaneTypeEntity),
        schema.create_table_from_entity(AirplaneEntity),
        schema.create_table_from_entity(CrewEntity),
        schema.create_table_from_entity(FlightEntity),
        schema.create_table_from_entity(FlightCrewEntity),
        schema.create_table_from_entity(OrderEntity),
        schema.create_table_from_entity(TicketEntity),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;
    }

    let seat_index = Index::create()
        .name(SEAT_INDEX)
        .table(TicketEntity)
        .col(TicketColumn::Row)
        .col(TicketColumn::Seat)
        .col(TicketColumn::FlightId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&seat_index)).await?;

    info!("Database schema ready");
    Ok(())
}
