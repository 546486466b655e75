// src/config.rs

use crate::{
    db::{
        AppointmentRepository, CatalogRepository, ClientRepository, DashboardRepository,
        InventoryRepository, ScheduleRepository, StaffRepository, UserRepository,
    },
    services::{
        appointment_service::AppointmentService, auth::AuthService,
        calendar_service::CalendarService, catalog_service::CatalogService,
        client_service::ClientService, dashboard_service::DashboardService,
        inventory_service::InventoryService, schedule_service::ScheduleService,
        staff_service::StaffService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

// Configuração lida do ambiente (.env é opcional).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub server_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let jwt_ttl_days = parse_or("JWT_TTL_DAYS", 7)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 5)?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_days,
            server_addr,
            db_max_connections,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} contém um valor inválido: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub staff_service: StaffService,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub appointment_service: AppointmentService,
    pub schedule_service: ScheduleService,
    pub calendar_service: CalendarService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre uma pool já criada.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new();
        let staff_repo = StaffRepository::new();
        let catalog_repo = CatalogRepository::new();
        let inventory_repo = InventoryRepository::new();
        let appointment_repo = AppointmentRepository::new();
        let schedule_repo = ScheduleRepository::new();
        let dashboard_repo = DashboardRepository::new();

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), config.jwt_ttl_days);
        let inventory_service = InventoryService::new(inventory_repo.clone());
        let appointment_service = AppointmentService::new(
            appointment_repo.clone(),
            catalog_repo.clone(),
            inventory_repo.clone(),
            schedule_repo.clone(),
            client_repo.clone(),
            staff_repo.clone(),
        );

        Self {
            db_pool,
            config,
            auth_service,
            client_service: ClientService::new(client_repo),
            staff_service: StaffService::new(staff_repo, appointment_repo.clone()),
            catalog_service: CatalogService::new(catalog_repo),
            inventory_service,
            appointment_service,
            schedule_service: ScheduleService::new(schedule_repo.clone()),
            calendar_service: CalendarService::new(appointment_repo, schedule_repo),
            dashboard_service: DashboardService::new(dashboard_repo),
        }
    }
}
