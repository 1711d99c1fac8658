use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireUser};
use crate::server::dto::{BrandDeleted, BrandRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::validate_name;
use crate::server::{AppState, ClientIp};
use crate::types::ActivityAction;

pub async fn list_brands(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let brands = state.store.list_brands()?;
    Ok(Json(ApiResponse::success(brands)))
}

pub async fn get_brand(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let brand = state
        .store
        .get_brand(id)?
        .ok_or_else(|| ApiError::not_found("Brand not found"))?;
    Ok(Json(ApiResponse::success(brand)))
}

pub async fn list_brand_models(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.get_brand(id)?.is_none() {
        return Err(ApiError::not_found("Brand not found"));
    }

    let models = state.store.list_brand_models(id)?;
    Ok(Json(ApiResponse::success(models)))
}

pub async fn create_brand(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(req): Json<BrandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&req.name, "Brand")?;

    let brand = state.store.create_brand(&name)?;

    state.log_activity(
        admin.id,
        ActivityAction::CreateBrand,
        format!("Created brand: {name}"),
        ip,
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            brand,
            "Brand created successfully",
        )),
    ))
}

pub async fn update_brand(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
    Json(req): Json<BrandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&req.name, "Brand")?;

    let brand = state.store.update_brand(id, &name)?;

    state.log_activity(
        admin.id,
        ActivityAction::UpdateBrand,
        format!("Renamed brand {id} to: {name}"),
        ip,
    );

    Ok(Json(ApiResponse::success_with_message(
        brand,
        "Brand updated successfully",
    )))
}

pub async fn delete_brand(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
) -> Result<impl IntoResponse, ApiError> {
    let brand = state
        .store
        .get_brand(id)?
        .ok_or_else(|| ApiError::not_found("Brand not found"))?;

    let models_removed = state.store.delete_brand(id)?;

    state.log_activity(
        admin.id,
        ActivityAction::DeleteBrand,
        format!(
            "Deleted brand: {} ({models_removed} models removed)",
            brand.name
        ),
        ip,
    );

    Ok(Json(ApiResponse::success_with_message(
        BrandDeleted { models_removed },
        "Brand deleted successfully",
    )))
}
