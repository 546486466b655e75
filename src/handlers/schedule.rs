// src/handlers/schedule.rs
// Horários de funcionamento e bloqueios de agenda.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::schedule::{BlockFilter, BusinessHours, BusinessHoursPayload, ScheduleBlock, ScheduleBlockPayload},
};

// =============================================================================
//  HORÁRIOS DE FUNCIONAMENTO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/business-hours",
    tag = "Business Hours",
    responses((status = 200, description = "Horários por dia da semana", body = Vec<BusinessHours>)),
    security(("api_jwt" = []))
)]
pub async fn list_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let hours = app_state
        .schedule_service
        .list_hours(&mut *rls_conn)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(hours)))
}

#[utoipa::path(
    get,
    path = "/api/business-hours/{id}",
    tag = "Business Hours",
    params(("id" = Uuid, Path, description = "ID do horário")),
    responses(
        (status = 200, description = "Horário", body = BusinessHours),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let hours = app_state
        .schedule_service
        .get_hours(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(hours)))
}

#[utoipa::path(
    post,
    path = "/api/business-hours",
    tag = "Business Hours",
    request_body = BusinessHoursPayload,
    responses(
        (status = 201, description = "Horário criado", body = BusinessHours),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Dia da semana já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<BusinessHoursPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let hours = app_state
        .schedule_service
        .create_hours(&mut *rls_conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(hours)))
}

#[utoipa::path(
    put,
    path = "/api/business-hours/{id}",
    tag = "Business Hours",
    params(("id" = Uuid, Path, description = "ID do horário")),
    request_body = BusinessHoursPayload,
    responses(
        (status = 200, description = "Horário atualizado", body = BusinessHours),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Dia da semana já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BusinessHoursPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let hours = app_state
        .schedule_service
        .update_hours(&mut *rls_conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(hours)))
}

// PATCH /api/business-hours/{id}/toggle
#[utoipa::path(
    patch,
    path = "/api/business-hours/{id}/toggle",
    tag = "Business Hours",
    params(("id" = Uuid, Path, description = "ID do horário")),
    responses(
        (status = 200, description = "Ativo/inativo invertido", body = BusinessHours),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let hours = app_state
        .schedule_service
        .toggle_hours(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(hours)))
}

#[utoipa::path(
    delete,
    path = "/api/business-hours/{id}",
    tag = "Business Hours",
    params(("id" = Uuid, Path, description = "ID do horário")),
    responses(
        (status = 204, description = "Horário excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .schedule_service
        .delete_hours(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  BLOQUEIOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/schedule-blocks",
    tag = "Schedule Blocks",
    params(BlockFilter),
    responses((status = 200, description = "Bloqueios por data", body = Vec<ScheduleBlock>)),
    security(("api_jwt" = []))
)]
pub async fn list_blocks(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<BlockFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let blocks = app_state
        .schedule_service
        .list_blocks(&mut *rls_conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(blocks)))
}

#[utoipa::path(
    get,
    path = "/api/schedule-blocks/{id}",
    tag = "Schedule Blocks",
    params(("id" = Uuid, Path, description = "ID do bloqueio")),
    responses(
        (status = 200, description = "Bloqueio", body = ScheduleBlock),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_block(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let block = app_state
        .schedule_service
        .get_block(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(block)))
}

#[utoipa::path(
    post,
    path = "/api/schedule-blocks",
    tag = "Schedule Blocks",
    request_body = ScheduleBlockPayload,
    responses(
        (status = 201, description = "Bloqueio criado", body = ScheduleBlock),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_block(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ScheduleBlockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let block = app_state
        .schedule_service
        .create_block(&mut *rls_conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(block)))
}

#[utoipa::path(
    put,
    path = "/api/schedule-blocks/{id}",
    tag = "Schedule Blocks",
    params(("id" = Uuid, Path, description = "ID do bloqueio")),
    request_body = ScheduleBlockPayload,
    responses(
        (status = 200, description = "Bloqueio atualizado", body = ScheduleBlock),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_block(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleBlockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let block = app_state
        .schedule_service
        .update_block(&mut *rls_conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(block)))
}

#[utoipa::path(
    delete,
    path = "/api/schedule-blocks/{id}",
    tag = "Schedule Blocks",
    params(("id" = Uuid, Path, description = "ID do bloqueio")),
    responses(
        (status = 204, description = "Bloqueio excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_block(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .schedule_service
        .delete_block(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
