//! Reference data: countries, airports, routes, airplane types, airplanes
//! and crew members

use super::{
    contains_ci, deleted, index_by_id, related, term, AirplaneRecord, AirportFilter,
    AirportRecord, Repository, RouteRecord,
};
use crate::db::inputs::*;
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, info};

impl Repository {
    // ========================================================================
    // Countries
    // ========================================================================

    /// List countries, optionally filtered by a name fragment
    pub async fn list_countries(&self, name: Option<String>) -> Result<Vec<Country>> {
        let mut query = CountryEntity::find().order_by_asc(CountryColumn::Id);

        if let Some(name) = term(&name) {
            query = query.filter(contains_ci(Expr::col((CountryEntity, CountryColumn::Name)), name));
        }

        query.all(self.conn()).await.map_err(Into::into)
    }

    pub async fn country(&self, id: i32) -> Result<Country> {
        CountryEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Country", id))
    }

    pub async fn create_country(&self, input: CountryInput) -> Result<Country> {
        let country = CountryActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(self.conn())
        .await?;

        info!(country_id = country.id, "Country created");
        Ok(country)
    }

    pub async fn update_country(&self, id: i32, changes: CountryChanges) -> Result<Country> {
        let existing = self.country(id).await?;
        let mut active: CountryActiveModel = existing.clone().into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await.map_err(Into::into)
    }

    /// Delete a country together with its airports and everything below them
    pub async fn delete_country(&self, id: i32) -> Result<()> {
        let result = CountryEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Country", id)
    }

    // ========================================================================
    // Airports
    // ========================================================================

    /// List airports, filtered by airport and/or country name fragments
    pub async fn list_airports(&self, filter: &AirportFilter) -> Result<Vec<AirportRecord>> {
        let mut query = AirportEntity::find()
            .find_also_related(CountryEntity)
            .order_by_asc(AirportColumn::Id);

        if let Some(name) = term(&filter.name) {
            query = query.filter(contains_ci(Expr::col((AirportEntity, AirportColumn::Name)), name));
        }
        if let Some(country) = term(&filter.country) {
            query = query.filter(contains_ci(
                Expr::col((CountryEntity, CountryColumn::Name)),
                country,
            ));
        }

        query
            .all(self.conn())
            .await?
            .into_iter()
            .map(airport_record)
            .collect()
    }

    pub async fn airport(&self, id: i32) -> Result<AirportRecord> {
        let row = AirportEntity::find_by_id(id)
            .find_also_related(CountryEntity)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Airport", id))?;

        airport_record(row)
    }

    pub async fn create_airport(&self, input: AirportInput) -> Result<AirportRecord> {
        let airport = AirportActiveModel {
            name: Set(input.name),
            closest_big_city: Set(input.closest_big_city),
            country_id: Set(input.country),
            ..Default::default()
        }
        .insert(self.conn())
        .await?;

        info!(airport_id = airport.id, country_id = airport.country_id, "Airport created");
        self.airport(airport.id).await
    }

    pub async fn update_airport(&self, id: i32, changes: AirportChanges) -> Result<AirportRecord> {
        let existing = self.airport(id).await?;
        let mut active: AirportActiveModel = existing.airport.clone().into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(city) = changes.closest_big_city {
            active.closest_big_city = Set(city);
        }
        if let Some(country) = changes.country {
            active.country_id = Set(country);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await?;
        self.airport(id).await
    }

    pub async fn delete_airport(&self, id: i32) -> Result<()> {
        let result = AirportEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Airport", id)
    }

    // ========================================================================
    // Routes
    // ========================================================================

    pub async fn list_routes(&self) -> Result<Vec<RouteRecord>> {
        let routes = RouteEntity::find()
            .order_by_asc(RouteColumn::Id)
            .all(self.conn())
            .await?;

        route_records(self.conn(), routes).await
    }

    pub async fn route(&self, id: i32) -> Result<RouteRecord> {
        let route = RouteEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Route", id))?;

        single(route_records(self.conn(), vec![route]).await?, "Route", id)
    }

    pub async fn create_route(&self, input: RouteInput) -> Result<RouteRecord> {
        let route = RouteActiveModel {
            source_id: Set(input.source),
            destination_id: Set(input.destination),
            distance: Set(input.distance),
            ..Default::default()
        }
        .insert(self.conn())
        .await?;

        info!(
            route_id = route.id,
            source_id = route.source_id,
            destination_id = route.destination_id,
            "Route created"
        );
        self.route(route.id).await
    }

    pub async fn update_route(&self, id: i32, changes: RouteChanges) -> Result<RouteRecord> {
        let existing = self.route(id).await?;
        let mut active: RouteActiveModel = existing.route.clone().into();

        if let Some(source) = changes.source {
            active.source_id = Set(source);
        }
        if let Some(destination) = changes.destination {
            active.destination_id = Set(destination);
        }
        if let Some(distance) = changes.distance {
            active.distance = Set(distance);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await?;
        self.route(id).await
    }

    pub async fn delete_route(&self, id: i32) -> Result<()> {
        let result = RouteEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Route", id)
    }

    // ========================================================================
    // Airplane types
    // ========================================================================

    pub async fn list_airplane_types(&self) -> Result<Vec<AirplaneType>> {
        AirplaneTypeEntity::find()
            .order_by_asc(AirplaneTypeColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn airplane_type(&self, id: i32) -> Result<AirplaneType> {
        AirplaneTypeEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("AirplaneType", id))
    }

    pub async fn create_airplane_type(&self, input: AirplaneTypeInput) -> Result<AirplaneType> {
        AirplaneTypeActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(self.conn())
        .await
        .map_err(Into::into)
    }

    pub async fn update_airplane_type(
        &self,
        id: i32,
        changes: AirplaneTypeChanges,
    ) -> Result<AirplaneType> {
        let existing = self.airplane_type(id).await?;
        let mut active: AirplaneTypeActiveModel = existing.clone().into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await.map_err(Into::into)
    }

    pub async fn delete_airplane_type(&self, id: i32) -> Result<()> {
        let result = AirplaneTypeEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "AirplaneType", id)
    }

    // ========================================================================
    // Airplanes
    // ========================================================================

    pub async fn list_airplanes(&self) -> Result<Vec<AirplaneRecord>> {
        self.airplanes_where(None).await
    }

    pub async fn airplane(&self, id: i32) -> Result<AirplaneRecord> {
        single(self.airplanes_where(Some(id)).await?, "Airplane", id)
    }

    async fn airplanes_where(&self, id: Option<i32>) -> Result<Vec<AirplaneRecord>> {
        let mut query = AirplaneEntity::find()
            .find_also_related(AirplaneTypeEntity)
            .order_by_asc(AirplaneColumn::Id);

        if let Some(id) = id {
            query = query.filter(AirplaneColumn::Id.eq(id));
        }

        query
            .all(self.conn())
            .await?
            .into_iter()
            .map(|(airplane, airplane_type)| {
                let airplane_type = airplane_type.ok_or_else(|| AppError::Internal {
                    message: format!("airplane {} has no type", airplane.id),
                })?;
                Ok(AirplaneRecord { airplane, airplane_type })
            })
            .collect()
    }

    pub async fn create_airplane(&self, input: AirplaneInput) -> Result<AirplaneRecord> {
        let airplane = AirplaneActiveModel {
            name: Set(input.name),
            rows: Set(input.rows),
            seats_in_row: Set(input.seats_in_row),
            airplane_type_id: Set(input.airplane_type),
            image: Set(None),
            ..Default::default()
        }
        .insert(self.conn())
        .await?;

        info!(
            airplane_id = airplane.id,
            capacity = airplane.capacity(),
            "Airplane created"
        );
        self.airplane(airplane.id).await
    }

    pub async fn update_airplane(&self, id: i32, changes: AirplaneChanges) -> Result<AirplaneRecord> {
        let existing = self.airplane(id).await?;
        let mut active: AirplaneActiveModel = existing.airplane.clone().into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(rows) = changes.rows {
            active.rows = Set(rows);
        }
        if let Some(seats_in_row) = changes.seats_in_row {
            active.seats_in_row = Set(seats_in_row);
        }
        if let Some(airplane_type) = changes.airplane_type {
            active.airplane_type_id = Set(airplane_type);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await?;
        self.airplane(id).await
    }

    /// Point the airplane at a newly stored image
    pub async fn set_airplane_image(&self, id: i32, url: String) -> Result<AirplaneRecord> {
        let existing = self.airplane(id).await?;
        let mut active: AirplaneActiveModel = existing.airplane.into();
        active.image = Set(Some(url));
        active.update(self.conn()).await?;

        debug!(airplane_id = id, "Airplane image replaced");
        self.airplane(id).await
    }

    pub async fn delete_airplane(&self, id: i32) -> Result<()> {
        let result = AirplaneEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Airplane", id)
    }

    // ========================================================================
    // Crew
    // ========================================================================

    pub async fn list_crew(&self) -> Result<Vec<Crew>> {
        CrewEntity::find()
            .order_by_asc(CrewColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn crew_member(&self, id: i32) -> Result<Crew> {
        CrewEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Crew", id))
    }

    pub async fn create_crew_member(&self, input: CrewInput) -> Result<Crew> {
        CrewActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            ..Default::default()
        }
        .insert(self.conn())
        .await
        .map_err(Into::into)
    }

    pub async fn update_crew_member(&self, id: i32, changes: CrewChanges) -> Result<Crew> {
        let existing = self.crew_member(id).await?;
        let mut active: CrewActiveModel = existing.clone().into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn()).await.map_err(Into::into)
    }

    pub async fn delete_crew_member(&self, id: i32) -> Result<()> {
        let result = CrewEntity::delete_by_id(id).exec(self.conn()).await?;
        deleted(result.rows_affected, "Crew", id)
    }
}

fn airport_record((airport, country): (Airport, Option<Country>)) -> Result<AirportRecord> {
    let country = country.ok_or_else(|| AppError::Internal {
        message: format!("airport {} has no country", airport.id),
    })?;
    Ok(AirportRecord { airport, country })
}

fn single<T>(records: Vec<T>, resource_type: &str, id: i32) -> Result<T> {
    records
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(resource_type, id))
}

/// Attach endpoint airports to routes
pub(crate) async fn route_records<C: ConnectionTrait>(
    conn: &C,
    routes: Vec<Route>,
) -> Result<Vec<RouteRecord>> {
    let airports = index_by_id::<AirportEntity, _>(
        conn,
        AirportColumn::Id,
        routes.iter().flat_map(|r| [r.source_id, r.destination_id]),
        |a| a.id,
    )
    .await?;

    routes
        .into_iter()
        .map(|route| {
            Ok(RouteRecord {
                source: related(&airports, route.source_id, "airport")?,
                destination: related(&airports, route.destination_id, "airport")?,
                route,
            })
        })
        .collect()
}

/// Attach airplane types to airplanes
pub(crate) async fn airplane_records<C: ConnectionTrait>(
    conn: &C,
    airplanes: Vec<Airplane>,
) -> Result<Vec<AirplaneRecord>> {
    let types = index_by_id::<AirplaneTypeEntity, _>(
        conn,
        AirplaneTypeColumn::Id,
        airplanes.iter().map(|a| a.airplane_type_id),
        |t| t.id,
    )
    .await?;

    airplanes
        .into_iter()
        .map(|airplane| {
            Ok(AirplaneRecord {
                airplane_type: related(&types, airplane.airplane_type_id, "airplane type")?,
                airplane,
            })
        })
        .collect()
}
