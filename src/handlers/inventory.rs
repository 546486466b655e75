// src/handlers/inventory.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::inventory::{
        MovementFilter, MovementReasons, StockMovement, StockMovementEntry, StockMovementKind,
        StockMovementPayload, StockOverview,
    },
};

// GET /api/inventory/stock
#[utoipa::path(
    get,
    path = "/api/inventory/stock",
    tag = "Inventory",
    responses(
        (status = 200, description = "Saldo atual dos produtos ativos e resumo", body = StockOverview)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let overview = app_state
        .inventory_service
        .overview(&mut *rls_conn)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/inventory/movements
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(MovementFilter),
    responses(
        (status = 200, description = "Histórico de movimentações, mais recentes primeiro", body = Vec<StockMovementEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let movements = app_state
        .inventory_service
        .movements(&mut *rls_conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(movements)))
}

// POST /api/inventory/entries
#[utoipa::path(
    post,
    path = "/api/inventory/entries",
    tag = "Inventory",
    request_body = StockMovementPayload,
    responses(
        (status = 201, description = "Entrada registrada", body = StockMovement),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<StockMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    record(app_state, locale, user, StockMovementKind::In, payload).await
}

// POST /api/inventory/exits
#[utoipa::path(
    post,
    path = "/api/inventory/exits",
    tag = "Inventory",
    request_body = StockMovementPayload,
    responses(
        (status = 201, description = "Saída registrada", body = StockMovement),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_exit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<StockMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    record(app_state, locale, user, StockMovementKind::Out, payload).await
}

async fn record(
    app_state: AppState,
    locale: Locale,
    user: AuthenticatedUser,
    kind: StockMovementKind,
    payload: StockMovementPayload,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let movement = app_state
        .inventory_service
        .record_movement(&mut *rls_conn, kind, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// GET /api/inventory/reasons
#[utoipa::path(
    get,
    path = "/api/inventory/reasons",
    tag = "Inventory",
    responses((status = 200, description = "Motivos sugeridos por tipo", body = MovementReasons)),
    security(("api_jwt" = []))
)]
pub async fn list_reasons(State(app_state): State<AppState>) -> Json<MovementReasons> {
    Json(app_state.inventory_service.reasons())
}
