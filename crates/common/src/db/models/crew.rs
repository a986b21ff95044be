//! Crew member entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: String,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flight_crew::Entity")]
    FlightCrews,
}

impl Related<super::flight_crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlightCrews.def()
    }
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        super::flight_crew::Relation::Flight.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::flight_crew::Relation::Crew.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
