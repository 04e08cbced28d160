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
    AppState, CreateServiceRequest, Envelope, NewService, ServiceChanges, ServiceView,
    UpdateServiceRequest,
};
use crate::store::{CategoryStore, ServiceStore, Store};

const INVALID_PRICE: &str = "Price must be greater than zero";

async fn ensure_subcategory(store: &dyn Store, id: Uuid) -> AppResult<()> {
    match store.find_subcategory(id).await? {
        Some(_) => Ok(()),
        None => {
            warn!(subcategory_id = %id, "Unknown subcategory");
            Err(AppError::NotFound("Subcategory not found"))
        }
    }
}

/// POST /service/create
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    let service_name = payload
        .service_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let (Some(subcategory_id), Some(service_name), Some(price)) =
        (payload.subcategory, service_name, payload.price)
    else {
        return Err(AppError::bad_request(
            "Subcategory, serviceName, and price are required",
        ));
    };
    if price <= 0.0 {
        return Err(AppError::bad_request(INVALID_PRICE));
    }

    ensure_subcategory(state.store.as_ref(), subcategory_id).await?;

    let service = state
        .store
        .create_service(NewService {
            subcategory_id,
            service_name,
            description: payload.description,
            price,
            image: payload.image,
        })
        .await?;

    info!(service_id = %service.id, "Service created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Service created successfully", service)),
    ))
}

/// Lists services with the name of their subcategory resolved.
///
/// GET /service
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn list_services(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let services = state.store.list_services().await?;

    let mut views = Vec::with_capacity(services.len());
    for service in services {
        let subcategory_name = state
            .store
            .find_subcategory(service.subcategory_id)
            .await?
            .map(|sub| sub.name);
        views.push(ServiceView {
            service,
            subcategory_name,
        });
    }

    debug!(count = views.len(), "Fetched services");
    Ok(Json(Envelope::success("Services fetched successfully", views)))
}

/// PUT /service/update/{id}
#[instrument(skip(state, payload), fields(request_id = %Uuid::new_v4()))]
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    if payload.is_empty() {
        return Err(AppError::bad_request("Nothing to update"));
    }
    if payload.price.is_some_and(|price| price <= 0.0) {
        return Err(AppError::bad_request(INVALID_PRICE));
    }
    if let Some(subcategory_id) = payload.subcategory {
        ensure_subcategory(state.store.as_ref(), subcategory_id).await?;
    }

    let changes = ServiceChanges {
        subcategory_id: payload.subcategory,
        service_name: payload
            .service_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        description: payload.description,
        price: payload.price,
        image: payload.image,
    };

    let service = state
        .store
        .update_service(id, changes)
        .await?
        .ok_or(AppError::NotFound("Service not found"))?;

    info!("Service updated");
    Ok(Json(Envelope::success("Service updated successfully", service)))
}

/// DELETE /service/delete/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;
    let service = state
        .store
        .delete_service(id)
        .await?
        .ok_or(AppError::NotFound("Service not found"))?;

    info!("Service deleted");
    Ok(Json(Envelope::success("Service deleted successfully", service)))
}
