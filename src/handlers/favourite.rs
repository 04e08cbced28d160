use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{AppState, CreateFavoriteRequest, Envelope, FavoriteView};
use crate::store::{FavoriteStore, ServiceStore};

/// POST /favourite/create
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_favourite(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateFavoriteRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(user_id), Some(service_id)) = (payload.user_id, payload.service_id) else {
        return Err(AppError::bad_request("User ID and Service ID are required!"));
    };

    let favorite = state.store.create_favorite(user_id, service_id).await?;

    info!(favorite_id = %favorite.id, "Favorite added");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Favorite added successfully", favorite)),
    ))
}

/// Favorites of a user, each with its service loaded.
///
/// GET /favourite/{user_id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn list_favourites(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = Uuid::parse_str(&user_id)?;
    let favorites = state.store.favorites_for(user_id).await?;

    let mut views = Vec::with_capacity(favorites.len());
    for favorite in favorites {
        let service = state.store.find_service(favorite.service_id).await?;
        views.push(FavoriteView {
            id: favorite.id,
            user_id: favorite.user_id,
            service,
            created_at: favorite.created_at,
        });
    }

    debug!(count = views.len(), "Fetched favorites");
    Ok(Json(Envelope::success("Favorites fetched successfully", views)))
}

/// DELETE /favourite/delete/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn delete_favourite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;
    let favorite = state
        .store
        .delete_favorite(id)
        .await?
        .ok_or(AppError::NotFound("Favorite not found"))?;

    info!("Favorite removed");
    Ok(Json(Envelope::success("Favorite removed successfully", favorite)))
}
