//! SeaORM entity models
//!
//! Reference data (countries .. crews), the flight schedule, and the
//! order/ticket tables written by the booking engine.

pub mod country;
pub mod airport;
pub mod route;
pub mod airplane_type;
pub mod airplane;
pub mod crew;
pub mod flight;
pub mod flight_crew;
pub mod order;
pub mod ticket;

pub use country::{
    Entity as CountryEntity,
    Model as Country,
    ActiveModel as CountryActiveModel,
    Column as CountryColumn,
};

pub use airport::{
    Entity as AirportEntity,
    Model as Airport,
    ActiveModel as AirportActiveModel,
    Column as AirportColumn,
};

pub use route::{
    Entity as RouteEntity,
    Model as Route,
    ActiveModel as RouteActiveModel,
    Column as RouteColumn,
};

pub use airplane_type::{
    Entity as AirplaneTypeEntity,
    Model as AirplaneType,
    ActiveModel as AirplaneTypeActiveModel,
    Column as AirplaneTypeColumn,
};

pub use airplane::{
    Entity as AirplaneEntity,
    Model as Airplane,
    ActiveModel as AirplaneActiveModel,
    Column as AirplaneColumn,
};

pub use crew::{
    Entity as CrewEntity,
    Model as Crew,
    ActiveModel as CrewActiveModel,
    Column as CrewColumn,
};

pub use flight::{
    Entity as FlightEntity,
    Model as Flight,
    ActiveModel as FlightActiveModel,
    Column as FlightColumn,
};

pub use flight_crew::{
    Entity as FlightCrewEntity,
    Model as FlightCrew,
    ActiveModel as FlightCrewActiveModel,
    Column as FlightCrewColumn,
};

pub use order::{
    Entity as OrderEntity,
    Model as Order,
    ActiveModel as OrderActiveModel,
    Column as OrderColumn,
};

pub use ticket::{
    Entity as TicketEntity,
    Model as Ticket,
    ActiveModel as TicketActiveModel,
    Column as TicketColumn,
};
