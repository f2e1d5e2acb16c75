use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::careers::generator::{
    generate_questions, GenerateQuestionsRequest, GenerateQuestionsResponse,
};
use crate::careers::service::{add_career, update_career};
use crate::errors::AppError;
use crate::models::career::{Career, CareerInput};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CareerSavedResponse {
    pub message: &'static str,
    pub career: Career,
}

/// POST /api/v1/careers
pub async fn handle_add_career(
    State(state): State<AppState>,
    payload: Result<Json<CareerInput>, JsonRejection>,
) -> Result<Json<CareerSavedResponse>, AppError> {
    let Json(input) = payload?;
    let career = add_career(state.store.as_ref(), input).await?;
    Ok(Json(CareerSavedResponse {
        message: "Career added successfully",
        career,
    }))
}

/// GET /api/v1/careers/:id
pub async fn handle_get_career(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Career>, AppError> {
    let Path(id) = path?;
    let career = state
        .store
        .get_career(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {id} not found")))?;
    Ok(Json(career))
}

/// PUT /api/v1/careers/:id
pub async fn handle_update_career(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CareerInput>, JsonRejection>,
) -> Result<Json<CareerSavedResponse>, AppError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let career = update_career(state.store.as_ref(), id, input).await?;
    Ok(Json(CareerSavedResponse {
        message: "Career updated successfully",
        career,
    }))
}

/// POST /api/v1/careers/questions/generate
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    let Json(request) = payload?;
    let response = generate_questions(
        state.question_model.as_ref(),
        state.store.as_ref(),
        request,
    )
    .await?;
    Ok(Json(response))
}
