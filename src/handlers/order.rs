//! # Order Handlers
//!
//! Orders bind a customer to a technician for one service. Creation is the
//! only place roles are checked: the customer must hold the `customer` role
//! and the technician the `technician` role.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{
    AppState, CreateOrderRequest, Envelope, NewOrder, Order, OrderChanges, OrderParty,
    OrderStatus, OrderView, Party, Role, UpdateOrderRequest,
};
use crate::store::{AccountStore, OrderStore, Store};

/// Resolves both parties of an order to `{id, username, email}`.
async fn order_view(store: &dyn Store, order: Order) -> AppResult<OrderView> {
    let customer = store.find_account(order.customer_id).await?.map(Party::from);
    let technician = store
        .find_account(order.technician_id)
        .await?
        .map(Party::from);

    Ok(OrderView {
        id: order.id,
        customer,
        technician,
        service: order.service_id,
        status: order.status,
        order_date: order.order_date,
        completion_date: order.completion_date,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}

async fn has_role(store: &dyn Store, id: Uuid, role: Role) -> AppResult<bool> {
    Ok(store
        .find_account(id)
        .await?
        .is_some_and(|account| account.role == role))
}

/// POST /order/create
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(customer_id), Some(technician_id), Some(service_id)) =
        (payload.customer, payload.technician, payload.service)
    else {
        return Err(AppError::bad_request(
            "Customer, technician, and service are required.",
        ));
    };

    let store = state.store.as_ref();
    if !has_role(store, customer_id, Role::Customer).await? {
        warn!(%customer_id, "Order customer missing or not a customer");
        return Err(AppError::bad_request("Customer not found or invalid role."));
    }
    if !has_role(store, technician_id, Role::Technician).await? {
        warn!(%technician_id, "Order technician missing or not a technician");
        return Err(AppError::bad_request(
            "Technician not found or invalid role.",
        ));
    }

    let order = store
        .create_order(NewOrder {
            customer_id,
            technician_id,
            service_id,
        })
        .await?;

    info!(order_id = %order.id, "Order created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Order created successfully.", order)),
    ))
}

/// Orders of a user, looked up on the side matching the user's role.
///
/// GET /order/user/{user_id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = Uuid::parse_str(&user_id)?;
    let store = state.store.as_ref();

    let account = store
        .find_account(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    let party = match account.role {
        Role::Customer => OrderParty::Customer(user_id),
        Role::Technician => OrderParty::Technician(user_id),
    };

    let orders = store.orders_for(party).await?;
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(order_view(store, order).await?);
    }

    debug!(count = views.len(), "Fetched orders");
    Ok(Json(Envelope::success("Orders fetched successfully.", views)))
}

/// GET /order/order/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;
    let store = state.store.as_ref();

    let order = store
        .find_order(id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    let view = order_view(store, order).await?;
    Ok(Json(Envelope::success("Order fetched successfully.", view)))
}

/// Single order, visible only to its customer or technician.
///
/// GET /order/user/{user_id}/order/{order_id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn get_user_order(
    State(state): State<Arc<AppState>>,
    Path((user_id, order_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let user_id = Uuid::parse_str(&user_id)?;
    let order_id = Uuid::parse_str(&order_id)?;
    let store = state.store.as_ref();

    let order = store
        .find_order(order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    if !order.involves(user_id) {
        warn!("User is not a party of the order");
        return Err(AppError::Forbidden("You do not have access to this order."));
    }

    let view = order_view(store, order).await?;
    Ok(Json(Envelope::success("Order fetched successfully.", view)))
}

/// Changes the service and/or the status (`open` or `closed`).
///
/// PUT /order/update/{id}
#[instrument(skip(state, payload), fields(request_id = %Uuid::new_v4()))]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    let status = match payload.status.as_deref() {
        Some(raw) => Some(
            OrderStatus::parse(raw).ok_or_else(|| AppError::bad_request("Invalid status value."))?,
        ),
        None => None,
    };

    let order = state
        .store
        .update_order(
            id,
            OrderChanges {
                service_id: payload.service,
                status,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    info!(status = ?order.status, "Order updated");
    Ok(Json(Envelope::success("Order updated successfully.", order)))
}

/// DELETE /order/delete/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    if !state.store.delete_order(id).await? {
        return Err(AppError::NotFound("Order not found."));
    }

    info!("Order deleted");
    Ok(Json(Envelope::done("Order deleted successfully.")))
}
