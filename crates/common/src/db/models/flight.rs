//! Flight entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flights")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub route_id: i32,

    pub airplane_id: i32,

    pub departure_time: DateTimeWithTimeZone,

    pub arrival_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::route::Entity",
        from = "Column::RouteId",
        to = "super::route::Column::Id",
        on_delete = "Cascade"
    )]
    Route,

    #[sea_orm(
        belongs_to = "super::airplane::Entity",
        from = "Column::AirplaneId",
        to = "super::airplane::Column::Id",
        on_delete = "Cascade"
    )]
    Airplane,

    #[sea_orm(has_many = "super::flight_crew::Entity")]
    FlightCrews,

    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
}

impl Related<super::route::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Route.def()
    }
}

impl Related<super::airplane::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Airplane.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl Related<super::crew::Entity> for Entity {
    fn to() -> RelationDef {
        super::flight_crew::Relation::Crew.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::flight_crew::Relation::Flight.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
