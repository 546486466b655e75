// src/handlers/calendar.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::calendar::{CalendarMonth, CalendarQuery},
};

// GET /api/calendar?year=&month=
#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = "Calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Grid do mês com agendamentos agrupados por dia", body = CalendarMonth),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_month(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let month = app_state
        .calendar_service
        .month(&mut *rls_conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(month)))
}
