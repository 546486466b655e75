// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Staff ---
        handlers::staff::list_staff,
        handlers::staff::get_staff,
        handlers::staff::create_staff,
        handlers::staff::update_staff,
        handlers::staff::delete_staff,

        // --- Services ---
        handlers::catalog::list_services,
        handlers::catalog::get_service,
        handlers::catalog::create_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- INVENTORY ---
        handlers::inventory::get_stock,
        handlers::inventory::list_movements,
        handlers::inventory::add_entry,
        handlers::inventory::add_exit,
        handlers::inventory::list_reasons,

        // --- APPOINTMENTS ---
        handlers::appointments::list_appointments,
        handlers::appointments::form_options,
        handlers::appointments::get_appointment,
        handlers::appointments::create_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::change_status,
        handlers::appointments::delete_appointment,

        // --- Business Hours ---
        handlers::schedule::list_hours,
        handlers::schedule::get_hours,
        handlers::schedule::create_hours,
        handlers::schedule::update_hours,
        handlers::schedule::toggle_hours,
        handlers::schedule::delete_hours,

        // --- Schedule Blocks ---
        handlers::schedule::list_blocks,
        handlers::schedule::get_block,
        handlers::schedule::create_block,
        handlers::schedule::update_block,
        handlers::schedule::delete_block,

        // --- Calendar / Dashboard ---
        handlers::calendar::get_month,
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Cadastros ---
            models::client::Client,
            models::client::ClientPayload,
            models::staff::StaffMember,
            models::staff::StaffPayload,
            models::staff::StaffDetail,
            models::catalog::Service,
            models::catalog::ServicePayload,

            // --- Inventory ---
            models::inventory::Product,
            models::inventory::ProductPayload,
            models::inventory::StockMovementKind,
            models::inventory::StockMovement,
            models::inventory::StockMovementEntry,
            models::inventory::StockMovementPayload,
            models::inventory::CurrentStock,
            models::inventory::StockSummary,
            models::inventory::StockOverview,
            models::inventory::MovementReasons,

            // --- Appointments ---
            models::appointment::AppointmentStatus,
            models::appointment::Appointment,
            models::appointment::AppointmentListEntry,
            models::appointment::AppointmentProductLine,
            models::appointment::AppointmentDetail,
            models::appointment::ProductLinePayload,
            models::appointment::AppointmentPayload,
            models::appointment::StatusPayload,
            models::appointment::FormOptions,

            // --- Schedule ---
            models::schedule::BusinessHours,
            models::schedule::BusinessHoursPayload,
            models::schedule::ScheduleBlockKind,
            models::schedule::ScheduleBlock,
            models::schedule::ScheduleBlockPayload,

            // --- Calendar ---
            models::calendar::MonthRef,
            models::calendar::CalendarCell,
            models::calendar::CalendarMonth,

            // --- DASHBOARD ---
            models::dashboard::DailyCounters,
            models::dashboard::UpcomingAppointment,
            models::dashboard::ServiceRankingEntry,
            models::dashboard::RecentClient,
            models::dashboard::Dashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Clients", description = "Cadastro de Clientes"),
        (name = "Staff", description = "Colaboradores"),
        (name = "Services", description = "Catálogo de Serviços"),
        (name = "Products", description = "Cadastro de Produtos"),
        (name = "Inventory", description = "Saldo e Movimentações de Estoque"),
        (name = "Appointments", description = "Agendamentos"),
        (name = "Business Hours", description = "Horários de Funcionamento"),
        (name = "Schedule Blocks", description = "Bloqueios de Agenda"),
        (name = "Calendar", description = "Visão Mensal"),
        (name = "Dashboard", description = "Indicadores do Dia e do Mês")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
