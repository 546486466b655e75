// src/models/appointment.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{
    catalog::{validate_not_negative, Service},
    client::Client,
    empty_as_none,
    inventory::{validate_positive, CurrentStock},
    staff::StaffMember,
};
use crate::common::time::{hhmm, hhmm_option};

// --- Enums ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Ocupa a agenda (entra na checagem de conflito).
    pub fn occupies_schedule(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    /// Só agendamentos finalizados baixam estoque.
    pub fn consumes_stock(self) -> bool {
        self == AppointmentStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "14:30")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "15:15")]
    pub end_time: NaiveTime,
    pub client_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub status: AppointmentStatus,
    #[schema(example = "95.00")]
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem: agendamento + nomes das referências.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub appointment: Appointment,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub staff_name: Option<String>,
    pub service_name: Option<String>,
    pub service_duration_minutes: Option<i32>,
    pub service_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentProductLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub entry: AppointmentListEntry,
    pub products: Vec<AppointmentProductLine>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductLinePayload {
    pub product_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub date: NaiveDate,

    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "14:30")]
    pub start_time: NaiveTime,

    /// Calculado a partir da duração do serviço quando há serviço
    #[serde(default, with = "hhmm_option")]
    #[schema(value_type = Option<String>, example = "15:15")]
    pub end_time: Option<NaiveTime>,

    pub client_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub service_id: Option<Uuid>,

    #[serde(default)]
    pub status: AppointmentStatus,

    /// Valor manual; se ausente, serviço + produtos
    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub products: Vec<ProductLinePayload>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusPayload {
    pub status: AppointmentStatus,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub staff_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

// Valores já resolvidos (fim e total calculados) prontos para gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentValues {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub client_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub status: AppointmentStatus,
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

// Listas de referência do formulário de agendamento.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub clients: Vec<Client>,
    pub services: Vec<Service>,
    pub staff: Vec<StaffMember>,
    /// Apenas produtos ativos com saldo positivo
    pub products: Vec<CurrentStock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_and_short_clock() {
        let p: AppointmentPayload = serde_json::from_str(
            r#"{"date":"2025-05-10","startTime":"09:00","endTime":"","products":[{"productId":"6f1c2b1e-8a44-4a43-9a8e-0c2c1d2a0b11","quantity":2}]}"#,
        )
        .unwrap();
        assert_eq!(p.status, AppointmentStatus::Pending);
        assert_eq!(p.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(p.end_time.is_none());
        assert_eq!(p.products.len(), 1);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn nested_product_quantities_are_validated() {
        let p: AppointmentPayload = serde_json::from_str(
            r#"{"date":"2025-05-10","startTime":"09:00","products":[{"productId":"6f1c2b1e-8a44-4a43-9a8e-0c2c1d2a0b11","quantity":0}]}"#,
        )
        .unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(AppointmentStatus::Completed).unwrap(), "completed");
        let s: StatusPayload = serde_json::from_str(r#"{"status":"cancelled"}"#).unwrap();
        assert_eq!(s.status, AppointmentStatus::Cancelled);
        assert!(!s.status.occupies_schedule());
        assert!(AppointmentStatus::Completed.consumes_stock());
        assert!(!AppointmentStatus::Confirmed.consumes_stock());
    }
}
