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
    AppState, CategoryChanges, CreateCategoryRequest, Envelope, NewCategory, Subcategory,
    SubcategoryInput, UpdateCategoryRequest,
};
use crate::store::CategoryStore;

fn trimmed(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

const BLANK_SUBCATEGORY: &str = "Every subcategory needs a name";

/// Fails with 400 if any subcategory has a missing or blank name.
fn subcategories(input: Vec<SubcategoryInput>) -> AppResult<Vec<Subcategory>> {
    input
        .into_iter()
        .map(SubcategoryInput::into_subcategory)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            warn!("Subcategory without a name");
            AppError::bad_request(BLANK_SUBCATEGORY)
        })
}

/// POST /category/create
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let name = trimmed(payload.name);
    let subs = payload.subcategories.filter(|s| !s.is_empty());

    let (Some(name), Some(subs)) = (name, subs) else {
        warn!("Category without name or subcategories");
        return Err(AppError::bad_request(
            "Category name and subcategories are required",
        ));
    };

    let subcategories = subcategories(subs)?;
    let category = state
        .store
        .create_category(NewCategory {
            name,
            subcategories,
        })
        .await?;

    info!(category_id = %category.id, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Category created successfully", category)),
    ))
}

/// GET /category
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn list_categories(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let categories = state.store.list_categories().await?;
    debug!(count = categories.len(), "Fetched categories");
    Ok(Json(Envelope::success(
        "Categories fetched successfully",
        categories,
    )))
}

/// Replaces the name and/or the whole subcategory list.
///
/// PUT /category/update/{id}
#[instrument(skip(state, payload), fields(request_id = %Uuid::new_v4()))]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    let changes = CategoryChanges {
        name: trimmed(payload.name),
        subcategories: payload.subcategories.map(subcategories).transpose()?,
    };
    if changes.name.is_none() && changes.subcategories.is_none() {
        return Err(AppError::bad_request("Nothing to update"));
    }

    let category = state
        .store
        .update_category(id, changes)
        .await?
        .ok_or(AppError::NotFound("Category not found"))?;

    info!("Category updated");
    Ok(Json(Envelope::success(
        "Category updated successfully",
        category,
    )))
}

/// DELETE /category/delete/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;
    let category = state
        .store
        .delete_category(id)
        .await?
        .ok_or(AppError::NotFound("Category not found"))?;

    info!("Category deleted");
    Ok(Json(Envelope::success(
        "Category deleted successfully",
        category,
    )))
}
