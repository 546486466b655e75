// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o router completo. Tudo fora de `/api/auth` e `/api/health` exige Bearer token.
pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let staff_routes = Router::new()
        .route(
            "/",
            get(handlers::staff::list_staff).post(handlers::staff::create_staff),
        )
        .route(
            "/{id}",
            get(handlers::staff::get_staff)
                .put(handlers::staff::update_staff)
                .delete(handlers::staff::delete_staff),
        );

    let service_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_service)
                .put(handlers::catalog::update_service)
                .delete(handlers::catalog::delete_service),
        );

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let inventory_routes = Router::new()
        .route("/stock", get(handlers::inventory::get_stock))
        .route("/movements", get(handlers::inventory::list_movements))
        .route("/entries", post(handlers::inventory::add_entry))
        .route("/exits", post(handlers::inventory::add_exit))
        .route("/reasons", get(handlers::inventory::list_reasons));

    let appointment_routes = Router::new()
        .route(
            "/",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route("/form-options", get(handlers::appointments::form_options))
        .route(
            "/{id}",
            get(handlers::appointments::get_appointment)
                .put(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route("/{id}/status", patch(handlers::appointments::change_status));

    let hours_routes = Router::new()
        .route(
            "/",
            get(handlers::schedule::list_hours).post(handlers::schedule::create_hours),
        )
        .route(
            "/{id}",
            get(handlers::schedule::get_hours)
                .put(handlers::schedule::update_hours)
                .delete(handlers::schedule::delete_hours),
        )
        .route("/{id}/toggle", patch(handlers::schedule::toggle_hours));

    let block_routes = Router::new()
        .route(
            "/",
            get(handlers::schedule::list_blocks).post(handlers::schedule::create_block),
        )
        .route(
            "/{id}",
            get(handlers::schedule::get_block)
                .put(handlers::schedule::update_block)
                .delete(handlers::schedule::delete_block),
        );

    // Tudo que lê ou grava dados do usuário passa pelo auth_guard
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/services", service_routes)
        .nest("/api/products", product_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/business-hours", hours_routes)
        .nest("/api/schedule-blocks", block_routes)
        .route("/api/calendar", get(handlers::calendar::get_month))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
