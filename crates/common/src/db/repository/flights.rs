//! Flight schedule

use super::reference::{airplane_records, route_records};
use super::{deleted, index_by_id, related, FlightFilter, FlightRecord, Repository};
use crate::db::inputs::{FlightChanges, FlightInput};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

impl Repository {
    /// List flights, latest departure first. Tickets are not loaded.
    pub async fn list_flights(&self, filter: &FlightFilter) -> Result<Vec<FlightRecord>> {
        let mut query = FlightEntity::find()
            .order_by_desc(FlightColumn::DepartureTime)
            .order_by_asc(FlightColumn::Id);

        if let Some(after) = filter.departure_after {
            query = query.filter(FlightColumn::DepartureTime.gt(after));
        }
        if let Some(before) = filter.arrival_before {
            query = query.filter(FlightColumn::ArrivalTime.lt(before));
        }

        let flights = query.all(self.conn()).await?;
        flight_records(self.conn(), flights, false).await
    }

    /// Load one flight with everything its detail view shows, tickets included
    pub async fn flight(&self, id: i32) -> Result<FlightRecord> {
        let flight = FlightEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Flight", id))?;

        flight_records(self.conn(), vec![flight], true)
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("Flight", id))
    }

    /// Create a flight and its crew links in one transaction
    pub async fn create_flight(&self, input: FlightInput) -> Result<FlightRecord> {
        let id = self
            .pool
            .atomic(move |txn| {
                Box::pin(async move {
                    let flight = FlightActiveModel {
                        route_id: Set(input.route),
                        airplane_id: Set(input.airplane),
                        departure_time: Set(input.departure_time),
                        arrival_time: Set(input.arrival_time),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    replace_crew(txn, flight.id, &input.crew).await?;
                    Ok(flight.id)
                })
            })
            .await?;

        info!(flight_id = id, "Flight created");
        self.flight(id).await
    }

    /// Apply changes to a flight; a `crew` list replaces the whole link set
    pub async fn update_flight(&self, id: i32, changes: FlightChanges) -> Result<FlightRecord> {
        let existing = FlightEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Flight", id))?;

        self.pool
            .atomic(move |txn| {
                Box::pin(async move {
                    let mut active: FlightActiveModel = existing.into();

                    if let Some(route) = changes.route {
                        active.route_id = Set(route);
                    }
                    if let Some(airplane) = changes.airplane {
                        active.airplane_id = Set(airplane);
                    }
                    if let Some(departure) = changes.departure_time {
                        active.departure_time = Set(departure);
                    }
                    if let Some(arrival) = changes.arrival_time {
                        active.arrival_time = Set(arrival);
                    }

                    if active.is_changed() {
                        active.update(txn).await?;
                    }
                    if let Some(crew) = changes.crew {
                        replace_crew(txn, id, &crew).await?;
                    }
                    Ok(())
                })
            })
            .await?;

        self.flight(id).await
    }

    /// Delete a flight with its crew links and tickets
    pub async fn delete_flight(&self, id: i32) -> Result<()> {
        let result = FlightEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Flight", id)
    }

    /// The airplane bound to each of `flight_ids`; unknown flights are absent
    pub async fn airplanes_for_flights(
        &self,
        flight_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, Airplane>> {
        let ids: BTreeSet<i32> = flight_ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = FlightEntity::find()
            .find_also_related(AirplaneEntity)
            .filter(FlightColumn::Id.is_in(ids))
            .all(self.conn())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(flight, airplane)| airplane.map(|a| (flight.id, a)))
            .collect())
    }
}

async fn replace_crew(txn: &DatabaseTransaction, flight_id: i32, crew: &[i32]) -> Result<()> {
    FlightCrewEntity::delete_many()
        .filter(FlightCrewColumn::FlightId.eq(flight_id))
        .exec(txn)
        .await?;

    let crew: BTreeSet<i32> = crew.iter().copied().collect();
    if crew.is_empty() {
        return Ok(());
    }

    let links = crew.into_iter().map(|crew_id| FlightCrewActiveModel {
        flight_id: Set(flight_id),
        crew_id: Set(crew_id),
    });
    FlightCrewEntity::insert_many(links)
        .exec_without_returning(txn)
        .await?;

    Ok(())
}

/// Attach route, airplane, crew and optionally tickets to flights,
/// preserving the input order
pub(crate) async fn flight_records<C: ConnectionTrait>(
    conn: &C,
    flights: Vec<Flight>,
    with_tickets: bool,
) -> Result<Vec<FlightRecord>> {
    if flights.is_empty() {
        return Ok(Vec::new());
    }
    let flight_ids: BTreeSet<i32> = flights.iter().map(|f| f.id).collect();

    let routes = index_by_id::<RouteEntity, _>(
        conn,
        RouteColumn::Id,
        flights.iter().map(|f| f.route_id),
        |r| r.id,
    )
    .await?;
    let routes: HashMap<i32, _> = route_records(conn, routes.into_values().collect())
        .await?
        .into_iter()
        .map(|record| (record.route.id, record))
        .collect();

    let airplanes = index_by_id::<AirplaneEntity, _>(
        conn,
        AirplaneColumn::Id,
        flights.iter().map(|f| f.airplane_id),
        |a| a.id,
    )
    .await?;
    let airplanes: HashMap<i32, _> = airplane_records(conn, airplanes.into_values().collect())
        .await?
        .into_iter()
        .map(|record| (record.airplane.id, record))
        .collect();

    let links = FlightCrewEntity::find()
        .filter(FlightCrewColumn::FlightId.is_in(flight_ids.iter().copied()))
        .all(conn)
        .await?;
    let crew = index_by_id::<CrewEntity, _>(
        conn,
        CrewColumn::Id,
        links.iter().map(|l| l.crew_id),
        |c| c.id,
    )
    .await?;

    let mut crew_by_flight: HashMap<i32, Vec<Crew>> = HashMap::new();
    for link in &links {
        crew_by_flight
            .entry(link.flight_id)
            .or_default()
            .push(related(&crew, link.crew_id, "crew member")?);
    }

    let mut tickets_by_flight: HashMap<i32, Vec<Ticket>> = HashMap::new();
    if with_tickets {
        let tickets = TicketEntity::find()
            .filter(TicketColumn::FlightId.is_in(flight_ids.iter().copied()))
            .order_by_asc(TicketColumn::Id)
            .all(conn)
            .await?;
        for ticket in tickets {
            tickets_by_flight.entry(ticket.flight_id).or_default().push(ticket);
        }
    }

    flights
        .into_iter()
        .map(|flight| {
            let mut crew = crew_by_flight.remove(&flight.id).unwrap_or_default();
            crew.sort_by_key(|c| c.id);

            Ok(FlightRecord {
                route: related(&routes, flight.route_id, "route")?,
                airplane: related(&airplanes, flight.airplane_id, "airplane")?,
                crew,
                tickets: tickets_by_flight.remove(&flight.id).unwrap_or_default(),
                flight,
            })
        })
        .collect()
}
