//! Orders and their tickets
//!
//! Orders are written only by the booking engine; this side lists, reads
//! and deletes them within the caller's ownership scope.

use super::flights::flight_records;
use super::{deleted, index_by_id, FlightRecord, OrderRecord, Repository};
use crate::auth::OrderScope;
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::pagination::{Page, PageRequest};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QueryTrait, Select,
};
use std::collections::{BTreeSet, HashMap};

impl Repository {
    /// One page of the orders visible in `scope`, newest first
    pub async fn list_orders(
        &self,
        scope: OrderScope,
        request: &PageRequest,
    ) -> Result<Page<OrderRecord>> {
        let page = request.page();
        let paginator = scoped(OrderEntity::find(), scope)
            .order_by_desc(OrderColumn::CreatedAt)
            .order_by_desc(OrderColumn::Id)
            .paginate(self.conn(), request.page_size());

        let totals = paginator.num_items_and_pages().await?;
        if page > 1 && page > totals.number_of_pages {
            return Err(AppError::InvalidPage { page });
        }

        let orders = paginator.fetch_page(page - 1).await?;
        let records = order_records(self.conn(), orders, false).await?;

        Ok(Page::new(records, totals.number_of_items, request))
    }

    /// Load one order; orders outside `owner` read as missing
    pub async fn order(&self, id: i32, owner: Option<i32>, detailed: bool) -> Result<OrderRecord> {
        let order = scoped(OrderEntity::find_by_id(id), OrderScope { owner, user: None })
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;

        order_records(self.conn(), vec![order], detailed)
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("Order", id))
    }

    /// Delete an order and its tickets, releasing the seats
    pub async fn delete_order(&self, id: i32, owner: Option<i32>) -> Result<()> {
        let result = OrderEntity::delete_many()
            .filter(OrderColumn::Id.eq(id))
            .apply_if(owner, |query, owner| query.filter(OrderColumn::UserId.eq(owner)))
            .exec(self.conn())
            .await?;

        deleted(result.rows_affected, "Order", id)
    }
}

fn scoped(query: Select<OrderEntity>, scope: OrderScope) -> Select<OrderEntity> {
    query
        .apply_if(scope.owner, |query, owner| query.filter(OrderColumn::UserId.eq(owner)))
        .apply_if(scope.user, |query, user| query.filter(OrderColumn::UserId.eq(user)))
}

/// Attach tickets to orders, and the flights behind them when `detailed`
pub(crate) async fn order_records<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<Order>,
    detailed: bool,
) -> Result<Vec<OrderRecord>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let tickets = TicketEntity::find()
        .filter(TicketColumn::OrderId.is_in(orders.iter().map(|o| o.id)))
        .order_by_asc(TicketColumn::Id)
        .all(conn)
        .await?;

    let flights: HashMap<i32, FlightRecord> = if detailed {
        let flights = index_by_id::<FlightEntity, _>(
            conn,
            FlightColumn::Id,
            tickets.iter().map(|t| t.flight_id),
            |f| f.id,
        )
        .await?;
        flight_records(conn, flights.into_values().collect(), true)
            .await?
            .into_iter()
            .map(|record| (record.flight.id, record))
            .collect()
    } else {
        HashMap::new()
    };

    let mut tickets_by_order: HashMap<i32, Vec<Ticket>> = HashMap::new();
    for ticket in tickets {
        tickets_by_order.entry(ticket.order_id).or_default().push(ticket);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let tickets = tickets_by_order.remove(&order.id).unwrap_or_default();
            let flight_ids: BTreeSet<i32> = tickets.iter().map(|t| t.flight_id).collect();
            let flights = flight_ids
                .into_iter()
                .filter_map(|id| flights.get(&id).map(|f| (id, f.clone())))
                .collect();

            OrderRecord { order, tickets, flights }
        })
        .collect())
}
