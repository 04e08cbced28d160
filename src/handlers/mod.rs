//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the Handyhub application.
//! Each handler is responsible for processing specific HTTP requests and returning
//! the standard JSON envelope (or an HTML page for the verification link).
//!
//! ## Available Handlers
//!
//! - **Users** (`user`) - Signup, email verification, signin and profile CRUD
//! - **Categories** (`category`) - Categories with embedded subcategories
//! - **Services** (`service`) - Services offered under a subcategory
//! - **Favourites** (`favourite`) - Services bookmarked by a user
//! - **Orders** (`order`) - Orders between a customer and a technician
//! - **Health Check** (`health_check`) - Application health monitoring

mod category;
mod favourite;
mod health_check;
mod order;
mod service;
mod user;

pub use category::*;
pub use favourite::*;
pub use health_check::*;
pub use order::*;
pub use service::*;
pub use user::*;
