use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route(
            "/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub category: String,
    pub image: Option<String>,
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("product name is required".to_string()));
    }

    if payload.price < 0.0 {
        return Err(AppError::Validation(format!(
            "negative price for {}",
            payload.name
        )));
    }

    let product = Product {
        id: Uuid::new_v4(),
        name: payload.name,
        price: payload.price,
        unit: payload.unit,
        category: payload.category,
        image: payload.image,
        created_at: Utc::now(),
    };

    state.products.insert(product.id, product.clone());
    Ok(Json(product))
}

#[derive(Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Json<Vec<Product>> {
    let mut products: Vec<Product> = state
        .products
        .iter()
        .filter(|entry| {
            query
                .category
                .as_deref()
                .is_none_or(|category| entry.value().category == category)
        })
        .map(|entry| entry.value().clone())
        .collect();

    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(products)
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .products
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product.value().clone()))
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    let mut product = state
        .products
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("product name is required".to_string()));
        }
        product.name = name;
    }

    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(AppError::Validation(format!(
                "negative price for {}",
                product.name
            )));
        }
        product.price = price;
    }

    if let Some(unit) = payload.unit {
        product.unit = unit;
    }

    if let Some(category) = payload.category {
        product.category = category;
    }

    if let Some(image) = payload.image {
        product.image = Some(image);
    }

    Ok(Json(product.clone()))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .products
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(StatusCode::NO_CONTENT)
}
