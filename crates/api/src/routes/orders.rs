//! Order endpoints backed by the order saga.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{Order, OrderLineItem, OrderRecord, OrderStatus, PlaceOrder, UserId};
use order_store::ListQuery;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Raw pagination parameters; unparsable values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    fn to_query(&self) -> ListQuery {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        ListQuery::from_params(parse(&self.limit), parse(&self.offset))
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ItemsResponse {
    pub items: Vec<OrderLineItem>,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub items: Vec<Order>,
    pub limit: i64,
    pub offset: i64,
}

// -- Handlers --

/// POST /orders: run the creation saga.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderRecord>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidJson(format!("invalid json: {e}")))?;

    let command = req
        .items
        .into_iter()
        .fold(PlaceOrder::new(req.user_id), |cmd, item| {
            cmd.item(item.product_id, item.quantity)
        });
    let record = state.saga.create_order(command).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderRecord>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let record = state.saga.get_order(order_id).await?;
    Ok(Json(record))
}

/// GET /orders/{id}/items
#[tracing::instrument(skip(state))]
pub async fn items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let items = state.saga.order_items(order_id).await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /orders/user/{user_id}?limit&offset
#[tracing::instrument(skip(state))]
pub async fn list_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let query = params.to_query();
    let items = state
        .saga
        .list_orders(&UserId::from(user_id.as_str()), query)
        .await?;

    Ok(Json(OrderListResponse {
        items,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

/// PUT /orders/{id}/status
#[tracing::instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderRecord>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidJson(format!("invalid json: {e}")))?;

    let order_id = match parse_order_id(&id) {
        Ok(order_id) => order_id,
        Err(not_found) => {
            // An unknown status is reported before the missing order.
            OrderStatus::parse(&req.status).map_err(saga::SagaError::from)?;
            return Err(not_found);
        }
    };

    let record = state.saga.update_status(order_id, &req.status).await?;
    Ok(Json(record))
}

/// Order ids are UUIDs, so any other text names no order.
fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    OrderId::parse(id).map_err(|_| ApiError::NotFound(format!("Order not found: {id}")))
}
