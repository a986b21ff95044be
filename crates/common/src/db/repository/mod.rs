//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations. Reads that
//! feed the projector return "records": the row plus the related rows its
//! views need, loaded with one `IN (...)` query per relation.

mod flights;
mod orders;
mod reference;

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Airport with its country
#[derive(Debug, Clone)]
pub struct AirportRecord {
    pub airport: Airport,
    pub country: Country,
}

/// Route with both endpoint airports
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub route: Route,
    pub source: Airport,
    pub destination: Airport,
}

/// Airplane with its type
#[derive(Debug, Clone)]
pub struct AirplaneRecord {
    pub airplane: Airplane,
    pub airplane_type: AirplaneType,
}

/// Flight with route, airplane, crew and, for detail reads, its tickets
#[derive(Debug, Clone)]
pub struct FlightRecord {
    pub flight: Flight,
    pub route: RouteRecord,
    pub airplane: AirplaneRecord,
    pub crew: Vec<Crew>,
    pub tickets: Vec<Ticket>,
}

/// Order with its tickets and, for detail reads, every flight they are on
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order: Order,
    pub tickets: Vec<Ticket>,
    pub flights: HashMap<i32, FlightRecord>,
}

/// `?name=&country=` filter for airports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirportFilter {
    pub name: Option<String>,
    pub country: Option<String>,
}

/// `?departure=&arrival=` filter for flights, already parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightFilter {
    /// Strictly later departures only
    pub departure_after: Option<DateTimeWithTimeZone>,

    /// Strictly earlier arrivals only
    pub arrival_before: Option<DateTimeWithTimeZone>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Pool handle, for work that needs its own transaction
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

// ============================================================================
// Query helpers
// ============================================================================

/// Case-insensitive substring match on `column`
pub(crate) fn contains_ci(column: Expr, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Expr::expr(Func::lower(column))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

/// Trimmed, non-empty filter term
pub(crate) fn term(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Load rows whose `column` is one of `ids`, keyed by `key`
pub(crate) async fn index_by_id<E, C>(
    conn: &C,
    column: E::Column,
    ids: impl IntoIterator<Item = i32>,
    key: fn(&E::Model) -> i32,
) -> Result<HashMap<i32, E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(column.is_in(ids)).all(conn).await?;
    Ok(rows.into_iter().map(|row| (key(&row), row)).collect())
}

/// Look up a related row that a foreign key guarantees to exist
pub(crate) fn related<T: Clone>(rows: &HashMap<i32, T>, id: i32, what: &str) -> Result<T> {
    rows.get(&id).cloned().ok_or_else(|| AppError::Internal {
        message: format!("dangling {} reference {}", what, id),
    })
}

/// Map a zero-row delete to not-found
pub(crate) fn deleted(rows_affected: u64, resource_type: &str, id: i32) -> Result<()> {
    if rows_affected == 0 {
        return Err(AppError::not_found(resource_type, id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_ignores_blank_values() {
        assert_eq!(term(&None), None);
        assert_eq!(term(&Some("   ".to_string())), None);
        assert_eq!(term(&Some(" Kyiv ".to_string())), Some("Kyiv"));
    }

    #[test]
    fn test_deleted_reports_missing_rows() {
        assert!(deleted(1, "Country", 1).is_ok());
        let err = deleted(0, "Country", 9).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::NotFound);
    }
}
