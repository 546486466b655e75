// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::appointment::AppointmentStatus;
use crate::common::time::hhmm;

// 1. Contadores do dia (os cards do topo)
#[derive(Debug, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounters {
    pub confirmed_today: i64,
    pub completed_today: i64,
    /// Pendentes + confirmados de hoje
    pub upcoming_today: i64,
    pub total_clients: i64,
    pub low_stock_products: i64,
}

// 2. Próximos atendimentos
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,
    pub status: AppointmentStatus,
    pub client_name: Option<String>,
    pub service_name: Option<String>,
    pub service_price: Option<Decimal>,
}

// Linha bruta usada para receita e ranking de serviços do mês.
#[derive(Debug, Clone, FromRow)]
pub struct MonthAppointmentRow {
    pub date: NaiveDate,
    pub status: AppointmentStatus,
    pub service_name: Option<String>,
    pub service_price: Option<Decimal>,
}

// 3. Serviços mais realizados no mês
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRankingEntry {
    pub name: String,
    pub count: u32,
    pub total_value: Decimal,
}

// 4. Clientes recentes
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentClient {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counters: DailyCounters,
    pub revenue_today: Decimal,
    pub revenue_month: Decimal,
    pub average_ticket_month: Decimal,
    pub services_this_month: u32,
    pub upcoming: Vec<UpcomingAppointment>,
    pub popular_services: Vec<ServiceRankingEntry>,
    pub recent_clients: Vec<RecentClient>,
}
