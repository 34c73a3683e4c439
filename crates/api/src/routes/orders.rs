//! Order CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::{NewOrder, Order, OrderId};
use domain::OrderService;
use order_store::OrderRepository;
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderRepository> {
    pub order_service: OrderService<S>,
}

// -- Response types --

/// Envelope wrapped around every response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub order_id: OrderId,
}

// -- Handlers --

/// POST /orders — create an order with its items.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: OrderRepository + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<ApiResponse<OrderCreatedResponse>>, ApiError> {
    let Json(order) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let order_id = state.order_service.create_order(order).await?;

    Ok(Json(ApiResponse::success(
        "Order created",
        Some(OrderCreatedResponse { order_id }),
    )))
}

/// GET /orders — list every order with its items.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderRepository + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = state.order_service.get_orders().await?;

    Ok(Json(ApiResponse::success(
        "Successfully retrieved orders",
        Some(orders),
    )))
}

/// GET /orders/{id} — load one order.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderRepository + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get_order(order_id).await?;

    Ok(Json(ApiResponse::success("Order found", Some(order))))
}

/// PUT /orders/{id} — replace an order's fields and items.
#[tracing::instrument(skip(state, body))]
pub async fn update<S: OrderRepository + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let Json(order) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let order = order.with_id(order_id);
    state.order_service.update_order(order).await?;

    Ok(Json(ApiResponse::success("Order updated", None)))
}

/// DELETE /orders/{id} — delete an order and its items.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderRepository + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.order_service.delete_order(order_id).await?;

    Ok(Json(ApiResponse::success("Order deleted", None)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e: common::ParseOrderIdError| ApiError::BadRequest(e.to_string()))
}
