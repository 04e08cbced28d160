//! # Catalog Types
//!
//! Categories embed their subcategories; services point at a subcategory by id.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub subcategories: Vec<Subcategory>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Subcategory as supplied by clients. An existing id is kept so services
/// that reference it stay attached after a category update.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryInput {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

impl SubcategoryInput {
    /// `None` when the name is missing or blank.
    pub fn into_subcategory(self) -> Option<Subcategory> {
        let name = self.name?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Subcategory {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name,
        })
    }
}

/// Request payload for `POST /category/create`
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub subcategories: Option<Vec<SubcategoryInput>>,
}

/// Request payload for `PUT /category/update/{id}`
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub subcategories: Option<Vec<SubcategoryInput>>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub subcategories: Option<Vec<Subcategory>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    #[serde(rename = "subcategory")]
    pub subcategory_id: Uuid,
    pub service_name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Service with the name of its subcategory resolved, `None` when the
/// subcategory no longer exists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: Service,
    pub subcategory_name: Option<String>,
}

/// Request payload for `POST /service/create`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub subcategory: Option<Uuid>,
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
}

/// Request payload for `PUT /service/update/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub subcategory: Option<Uuid>,
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
}

impl UpdateServiceRequest {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subcategory.is_none()
            && self.service_name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub subcategory_id: Uuid,
    pub service_name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub subcategory_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
}
