//! Airplane entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "airplanes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub rows: i32,

    pub seats_in_row: i32,

    pub airplane_type_id: i32,

    /// Public URL of the uploaded image; only set through the upload action
    #[sea_orm(nullable)]
    pub image: Option<String>,
}

impl Model {
    /// Total number of seats, always derived
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::airplane_type::Entity",
        from = "Column::AirplaneTypeId",
        to = "super::airplane_type::Column::Id",
        on_delete = "Cascade"
    )]
    AirplaneType,

    #[sea_orm(has_many = "super::flight::Entity")]
    Flights,
}

impl Related<super::airplane_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AirplaneType.def()
    }
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_does_not_overflow() {
        let airplane = Model {
            id: 1,
            name: "An-225".to_string(),
            rows: 100_000,
            seats_in_row: 100_000,
            airplane_type_id: 1,
            image: None,
        };
        assert_eq!(airplane.capacity(), 10_000_000_000);
    }
}
