//! HTTP handlers

pub mod health;
pub mod analyze;
pub mod models;
pub mod features;

use crate::AppError;

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
