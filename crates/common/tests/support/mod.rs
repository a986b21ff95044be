#![allow(dead_code)]

use airport_common::config::DatabaseConfig;
use airport_common::db::inputs::*;
use airport_common::db::{AirplaneRecord, FlightRecord, RouteRecord};
use airport_common::timestamp;
use airport_common::{DbPool, Repository};
use sea_orm::prelude::DateTimeWithTimeZone;

/// Repository over a fresh in-memory SQLite database
pub async fn repository() -> Repository {
    let pool = DbPool::new(&DatabaseConfig::single("sqlite::memory:"))
        .await
        .expect("in-memory database");
    Repository::new(pool)
}

pub fn at(value: &str) -> DateTimeWithTimeZone {
    timestamp::parse(value).expect("valid timestamp")
}

/// Ukraine -> Boryspil / Lviv, one route, a 10x6 airplane and a flight
pub struct World {
    pub repo: Repository,
    pub country_id: i32,
    pub route: RouteRecord,
    pub airplane: AirplaneRecord,
    pub flight: FlightRecord,
}

pub async fn world() -> World {
    let repo = repository().await;

    let country = repo
        .create_country(CountryInput { name: "Ukraine".to_string() })
        .await
        .unwrap();
    let kbp = repo
        .create_airport(AirportInput {
            name: "Boryspil".to_string(),
            closest_big_city: "Kyiv".to_string(),
            country: country.id,
        })
        .await
        .unwrap();
    let lwo = repo
        .create_airport(AirportInput {
            name: "Lviv Danylo Halytskyi".to_string(),
            closest_big_city: "Lviv".to_string(),
            country: country.id,
        })
        .await
        .unwrap();
    let route = repo
        .create_route(RouteInput {
            source: kbp.airport.id,
            destination: lwo.airport.id,
            distance: 470,
        })
        .await
        .unwrap();
    let airplane_type = repo
        .create_airplane_type(AirplaneTypeInput { name: "Narrow-body".to_string() })
        .await
        .unwrap();
    let airplane = repo
        .create_airplane(AirplaneInput {
            name: "Boeing 737".to_string(),
            rows: 10,
            seats_in_row: 6,
            airplane_type: airplane_type.id,
        })
        .await
        .unwrap();
    let flight = repo
        .create_flight(FlightInput {
            route: route.route.id,
            airplane: airplane.airplane.id,
            crew: vec![],
            departure_time: at("2024-09-25T10:00:00Z"),
            arrival_time: at("2024-09-25T11:30:00Z"),
        })
        .await
        .unwrap();

    World {
        repo,
        country_id: country.id,
        route,
        airplane,
        flight,
    }
}

impl World {
    pub async fn add_flight(&self, departure: &str, arrival: &str) -> FlightRecord {
        self.repo
            .create_flight(FlightInput {
                route: self.route.route.id,
                airplane: self.airplane.airplane.id,
                crew: vec![],
                departure_time: at(departure),
                arrival_time: at(arrival),
            })
            .await
            .unwrap()
    }
}

pub fn tickets(flight: i32, seats: &[(i32, i32)]) -> OrderInput {
    OrderInput {
        tickets: seats
            .iter()
            .map(|&(row, seat)| TicketInput { row, seat, flight })
            .collect(),
    }
}
