//! Read-model projection
//!
//! One entity renders differently depending on the operation that returns
//! it. Callers pick the shape with [`ViewShape`]; each entity's view is an
//! untagged enum whose variants are the distinct JSON shapes it can take.
//! Projection never touches the database, so records must already carry
//! every related row the chosen shape shows.

use crate::booking::{Seat, SeatMap};
use crate::db::models::*;
use crate::db::{AirplaneRecord, AirportRecord, FlightRecord, OrderRecord, RouteRecord};
use crate::pagination::Page;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// Operation an entity is being rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewShape {
    /// Collection reads; relations rendered by name
    List,
    /// Single-item reads; relations nested
    Detail,
    /// Responses to create and update; relations rendered by id
    Write,
}

/// Render a loaded entity for one operation
pub trait Project {
    type View: Serialize;

    fn project(&self, shape: ViewShape) -> Self::View;
}

/// Project every item of a collection with the same shape
pub fn project_all<T: Project>(items: &[T], shape: ViewShape) -> Vec<T::View> {
    items.iter().map(|item| item.project(shape)).collect()
}

/// Project a page of orders for the collection endpoint
pub fn project_page(page: Page<OrderRecord>) -> Page<OrderView> {
    page.map(|record| record.project(ViewShape::List))
}

// ============================================================================
// Simple reference data: one shape for every operation
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CountryView {
    pub id: i32,
    pub name: String,
}

impl Project for Country {
    type View = CountryView;

    fn project(&self, _shape: ViewShape) -> CountryView {
        CountryView {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AirplaneTypeView {
    pub id: i32,
    pub name: String,
}

impl Project for AirplaneType {
    type View = AirplaneTypeView;

    fn project(&self, _shape: ViewShape) -> AirplaneTypeView {
        AirplaneTypeView {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrewView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl Project for Crew {
    type View = CrewView;

    fn project(&self, _shape: ViewShape) -> CrewView {
        CrewView {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
        }
    }
}

// ============================================================================
// Airports and routes
// ============================================================================

/// Airport with its country as an id
#[derive(Debug, Clone, Serialize)]
pub struct AirportBody {
    pub id: i32,
    pub name: String,
    pub closest_big_city: String,
    pub country: i32,
}

impl From<&Airport> for AirportBody {
    fn from(airport: &Airport) -> Self {
        AirportBody {
            id: airport.id,
            name: airport.name.clone(),
            closest_big_city: airport.closest_big_city.clone(),
            country: airport.country_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AirportView {
    /// Country by name
    Summary {
        id: i32,
        name: String,
        closest_big_city: String,
        country: String,
    },
    Full(AirportBody),
}

impl Project for AirportRecord {
    type View = AirportView;

    fn project(&self, shape: ViewShape) -> AirportView {
        match shape {
            ViewShape::List => AirportView::Summary {
                id: self.airport.id,
                name: self.airport.name.clone(),
                closest_big_city: self.airport.closest_big_city.clone(),
                country: self.country.name.clone(),
            },
            ViewShape::Detail | ViewShape::Write => AirportView::Full((&self.airport).into()),
        }
    }
}

/// Route with both airports nested
#[derive(Debug, Clone, Serialize)]
pub struct RouteDetail {
    pub id: i32,
    pub source: AirportBody,
    pub destination: AirportBody,
    pub distance: i32,
}

impl From<&RouteRecord> for RouteDetail {
    fn from(record: &RouteRecord) -> Self {
        RouteDetail {
            id: record.route.id,
            source: (&record.source).into(),
            destination: (&record.destination).into(),
            distance: record.route.distance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RouteView {
    /// Airports by name
    Summary {
        id: i32,
        source: String,
        destination: String,
        distance: i32,
    },
    Detail(RouteDetail),
    /// Airports by id
    Full {
        id: i32,
        source: i32,
        destination: i32,
        distance: i32,
    },
}

impl Project for RouteRecord {
    type View = RouteView;

    fn project(&self, shape: ViewShape) -> RouteView {
        match shape {
            ViewShape::List => RouteView::Summary {
                id: self.route.id,
                source: self.source.name.clone(),
                destination: self.destination.name.clone(),
                distance: self.route.distance,
            },
            ViewShape::Detail => RouteView::Detail(self.into()),
            ViewShape::Write => RouteView::Full {
                id: self.route.id,
                source: self.route.source_id,
                destination: self.route.destination_id,
                distance: self.route.distance,
            },
        }
    }
}

// ============================================================================
// Airplanes
// ============================================================================

/// Airplane with its type as an id
#[derive(Debug, Clone, Serialize)]
pub struct AirplaneBody {
    pub id: i32,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: i32,
    pub capacity: i64,
    pub image: Option<String>,
}

impl From<&Airplane> for AirplaneBody {
    fn from(airplane: &Airplane) -> Self {
        AirplaneBody {
            id: airplane.id,
            name: airplane.name.clone(),
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane.airplane_type_id,
            capacity: airplane.capacity(),
            image: airplane.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AirplaneView {
    /// Airplane type by name
    Summary {
        id: i32,
        name: String,
        rows: i32,
        seats_in_row: i32,
        airplane_type: String,
        capacity: i64,
        image: Option<String>,
    },
    Full(AirplaneBody),
}

impl Project for AirplaneRecord {
    type View = AirplaneView;

    fn project(&self, shape: ViewShape) -> AirplaneView {
        let airplane = &self.airplane;
        match shape {
            ViewShape::List | ViewShape::Detail => AirplaneView::Summary {
                id: airplane.id,
                name: airplane.name.clone(),
                rows: airplane.rows,
                seats_in_row: airplane.seats_in_row,
                airplane_type: self.airplane_type.name.clone(),
                capacity: airplane.capacity(),
                image: airplane.image.clone(),
            },
            ViewShape::Write => AirplaneView::Full(airplane.into()),
        }
    }
}

/// Response of the image upload action
#[derive(Debug, Clone, Serialize)]
pub struct AirplaneImageView {
    pub id: i32,
    pub image: Option<String>,
}

impl From<&AirplaneRecord> for AirplaneImageView {
    fn from(record: &AirplaneRecord) -> Self {
        AirplaneImageView {
            id: record.airplane.id,
            image: record.airplane.image.clone(),
        }
    }
}

// ============================================================================
// Flights
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FlightDetail {
    pub id: i32,
    pub route: RouteDetail,
    pub airplane: AirplaneBody,
    pub crew: Vec<CrewView>,
    pub departure_time: DateTimeWithTimeZone,
    pub arrival_time: DateTimeWithTimeZone,
    /// Every sold seat on the flight, whichever order holds it
    pub taken_places: Vec<Seat>,
    pub tickets_available: i64,
}

impl From<&FlightRecord> for FlightDetail {
    fn from(record: &FlightRecord) -> Self {
        let seat_map = SeatMap::new(&record.airplane.airplane, &record.tickets);

        FlightDetail {
            id: record.flight.id,
            route: (&record.route).into(),
            airplane: (&record.airplane.airplane).into(),
            crew: project_all(&record.crew, ViewShape::Detail),
            departure_time: record.flight.departure_time,
            arrival_time: record.flight.arrival_time,
            taken_places: seat_map.taken().collect(),
            tickets_available: seat_map.available_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FlightView {
    /// Airplane by name, crew by full name
    Summary {
        id: i32,
        route: i32,
        airplane: String,
        crew: Vec<String>,
        departure_time: DateTimeWithTimeZone,
        arrival_time: DateTimeWithTimeZone,
    },
    Detail(FlightDetail),
    /// Relations by id
    Full {
        id: i32,
        route: i32,
        airplane: i32,
        crew: Vec<i32>,
        departure_time: DateTimeWithTimeZone,
        arrival_time: DateTimeWithTimeZone,
    },
}

impl Project for FlightRecord {
    type View = FlightView;

    fn project(&self, shape: ViewShape) -> FlightView {
        let flight = &self.flight;
        match shape {
            ViewShape::List => FlightView::Summary {
                id: flight.id,
                route: flight.route_id,
                airplane: self.airplane.airplane.name.clone(),
                crew: self.crew.iter().map(Crew::full_name).collect(),
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
            },
            ViewShape::Detail => FlightView::Detail(self.into()),
            ViewShape::Write => FlightView::Full {
                id: flight.id,
                route: flight.route_id,
                airplane: flight.airplane_id,
                crew: self.crew.iter().map(|c| c.id).collect(),
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
            },
        }
    }
}

// ============================================================================
// Orders and tickets
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub id: i32,
    pub row: i32,
    pub seat: i32,
    pub flight: i32,
}

impl From<&Ticket> for TicketView {
    fn from(ticket: &Ticket) -> Self {
        TicketView {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            flight: ticket.flight_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub id: i32,
    pub row: i32,
    pub seat: i32,
    pub flight: FlightDetail,
}

/// A ticket in an order detail; flat when its flight was not loaded
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TicketEntry {
    Detail(TicketDetail),
    Flat(TicketView),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OrderView {
    Summary {
        id: i32,
        created_at: DateTimeWithTimeZone,
        tickets: Vec<TicketView>,
        user: i32,
    },
    Detail {
        id: i32,
        created_at: DateTimeWithTimeZone,
        tickets: Vec<TicketEntry>,
        user: i32,
    },
}

impl Project for OrderRecord {
    type View = OrderView;

    fn project(&self, shape: ViewShape) -> OrderView {
        let order = &self.order;
        match shape {
            ViewShape::List | ViewShape::Write => OrderView::Summary {
                id: order.id,
                created_at: order.created_at,
                tickets: self.tickets.iter().map(TicketView::from).collect(),
                user: order.user_id,
            },
            ViewShape::Detail => OrderView::Detail {
                id: order.id,
                created_at: order.created_at,
                tickets: self
                    .tickets
                    .iter()
                    .map(|ticket| match self.flights.get(&ticket.flight_id) {
                        Some(flight) => TicketEntry::Detail(TicketDetail {
                            id: ticket.id,
                            row: ticket.row,
                            seat: ticket.seat,
                            flight: flight.into(),
                        }),
                        None => TicketEntry::Flat(ticket.into()),
                    })
                    .collect(),
                user: order.user_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, to_value};
    use std::collections::HashMap;

    fn at(day: u32) -> DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2024, 9, day, 10, 0, 0).unwrap().into()
    }

    fn airport(id: i32, name: &str) -> Airport {
        Airport {
            id,
            name: name.to_string(),
            closest_big_city: format!("{} City", name),
            country_id: 1,
        }
    }

    fn flight_record() -> FlightRecord {
        FlightRecord {
            flight: Flight {
                id: 5,
                route_id: 3,
                airplane_id: 2,
                departure_time: at(25),
                arrival_time: at(26),
            },
            route: RouteRecord {
                route: Route { id: 3, source_id: 1, destination_id: 2, distance: 1200 },
                source: airport(1, "Boryspil"),
                destination: airport(2, "Heathrow"),
            },
            airplane: AirplaneRecord {
                airplane: Airplane {
                    id: 2,
                    name: "Mriya".to_string(),
                    rows: 10,
                    seats_in_row: 6,
                    airplane_type_id: 4,
                    image: None,
                },
                airplane_type: AirplaneType { id: 4, name: "Cargo".to_string() },
            },
            crew: vec![Crew {
                id: 8,
                first_name: "Olena".to_string(),
                last_name: "Kovalenko".to_string(),
            }],
            tickets: vec![
                Ticket { id: 11, row: 2, seat: 3, flight_id: 5, order_id: 1 },
                Ticket { id: 10, row: 1, seat: 1, flight_id: 5, order_id: 1 },
            ],
        }
    }

    #[test]
    fn test_airplane_capacity_and_type_by_shape() {
        let record = flight_record().airplane;

        let listed = to_value(record.project(ViewShape::List)).unwrap();
        assert_eq!(listed["airplane_type"], "Cargo");
        assert_eq!(listed["capacity"], 60);
        assert_eq!(listed["image"], serde_json::Value::Null);

        let written = to_value(record.project(ViewShape::Write)).unwrap();
        assert_eq!(written["airplane_type"], 4);
        assert_eq!(written["capacity"], 60);
    }

    #[test]
    fn test_airport_country_by_shape() {
        let record = AirportRecord {
            airport: airport(1, "Boryspil"),
            country: Country { id: 1, name: "Ukraine".to_string() },
        };

        assert_eq!(to_value(record.project(ViewShape::List)).unwrap()["country"], "Ukraine");
        assert_eq!(to_value(record.project(ViewShape::Detail)).unwrap()["country"], 1);
    }

    #[test]
    fn test_route_shapes() {
        let record = flight_record().route;

        let listed = to_value(record.project(ViewShape::List)).unwrap();
        assert_eq!(listed["source"], "Boryspil");

        let detail = to_value(record.project(ViewShape::Detail)).unwrap();
        assert_eq!(detail["destination"]["name"], "Heathrow");
        assert_eq!(detail["destination"]["country"], 1);

        let written = to_value(record.project(ViewShape::Write)).unwrap();
        assert_eq!(written["source"], 1);
    }

    #[test]
    fn test_flight_list_shape() {
        let listed = to_value(flight_record().project(ViewShape::List)).unwrap();

        assert_eq!(listed["route"], 3);
        assert_eq!(listed["airplane"], "Mriya");
        assert_eq!(listed["crew"], json!(["Olena Kovalenko"]));
        assert!(listed.get("taken_places").is_none());
    }

    #[test]
    fn test_flight_detail_shape() {
        let detail = to_value(flight_record().project(ViewShape::Detail)).unwrap();

        assert_eq!(detail["route"]["source"]["name"], "Boryspil");
        assert_eq!(detail["airplane"]["capacity"], 60);
        assert_eq!(detail["crew"][0]["full_name"], "Olena Kovalenko");
        assert_eq!(
            detail["taken_places"],
            json!([{ "row": 1, "seat": 1 }, { "row": 2, "seat": 3 }])
        );
        assert_eq!(detail["tickets_available"], 58);
    }

    #[test]
    fn test_order_detail_nests_flights() {
        let flight = flight_record();
        let tickets = flight.tickets.clone();
        let record = OrderRecord {
            order: Order { id: 1, user_id: 7, created_at: at(1) },
            tickets,
            flights: HashMap::from([(5, flight)]),
        };

        let summary = to_value(record.project(ViewShape::List)).unwrap();
        assert_eq!(summary["user"], 7);
        assert_eq!(summary["tickets"][0]["flight"], 5);

        let detail = to_value(record.project(ViewShape::Detail)).unwrap();
        assert_eq!(detail["tickets"][0]["flight"]["id"], 5);
        assert_eq!(detail["tickets"][1]["flight"]["airplane"]["name"], "Mriya");
    }
}
