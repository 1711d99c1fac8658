use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireUser};
use crate::server::dto::{CreateModelRequest, ListModelsParams, SearchParams, UpdateModelRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::validate_name;
use crate::server::{AppState, ClientIp};
use crate::store::{ModelOrder, ModelPatch, NewModel};
use crate::types::ActivityAction;

pub async fn list_models(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListModelsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let order = match params.order.as_deref() {
        Some("recent") => ModelOrder::Recent,
        _ => ModelOrder::ByBrandAndName,
    };

    let models = state.store.list_models(order)?;
    Ok(Json(ApiResponse::success(models)))
}

pub async fn search_models(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Search query is required"));
    }

    let models = state.store.search_models(&query)?;
    Ok(Json(ApiResponse::success(models)))
}

pub async fn get_model(
    _user: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let model = state
        .store
        .get_model(id)?
        .ok_or_else(|| ApiError::not_found("Model not found"))?;
    Ok(Json(ApiResponse::success(model)))
}

pub async fn create_model(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(req): Json<CreateModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&req.name, "Model")?;

    let model = state
        .store
        .create_model(&NewModel {
            brand_id: req.brand_id,
            name: name.clone(),
            image_url: req.image_url.filter(|url| !url.is_empty()),
            reset_instructions: req.reset_instructions.unwrap_or_default(),
            possible_passwords: req.possible_passwords.unwrap_or_default(),
        })
        .map_err(|e| match e {
            crate::error::Error::NotFound => ApiError::not_found("Brand not found"),
            other => ApiError::from(other),
        })?;

    state.log_activity(
        admin.id,
        ActivityAction::CreateModel,
        format!("Created model: {name} (brand: {})", model.brand_name),
        ip,
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            model,
            "Model created successfully",
        )),
    ))
}

pub async fn update_model(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
    Json(req): Json<UpdateModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = match &req.name {
        Some(name) => Some(validate_name(name, "Model")?),
        None => None,
    };

    if state.store.get_model(id)?.is_none() {
        return Err(ApiError::not_found("Model not found"));
    }

    let model = state
        .store
        .update_model(
            id,
            &ModelPatch {
                brand_id: req.brand_id,
                name,
                image_url: req.image_url,
                reset_instructions: req.reset_instructions,
                possible_passwords: req.possible_passwords,
            },
        )
        .map_err(|e| match e {
            crate::error::Error::NotFound => ApiError::not_found("Brand not found"),
            other => ApiError::from(other),
        })?;

    state.log_activity(
        admin.id,
        ActivityAction::UpdateModel,
        format!("Updated model: {}", model.model.name),
        ip,
    );

    Ok(Json(ApiResponse::success_with_message(
        model,
        "Model updated successfully",
    )))
}

pub async fn delete_model(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
) -> Result<impl IntoResponse, ApiError> {
    let name = state.store.delete_model(id).map_err(|e| match e {
        crate::error::Error::NotFound => ApiError::not_found("Model not found"),
        other => ApiError::from(other),
    })?;

    state.log_activity(
        admin.id,
        ActivityAction::DeleteModel,
        format!("Deleted model: {name}"),
        ip,
    );

    Ok(Json(ApiResponse::message("Model deleted successfully")))
}
