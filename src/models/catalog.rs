// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{default_true, empty_as_none};

// Serviço oferecido (corte, escova, manicure...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    #[schema(example = "Corte feminino")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "80.00")]
    pub price: Decimal,
    #[schema(example = 45)]
    pub duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 1440, message = "A duração deve estar entre 1 e 1440 minutos."))]
    pub duration_minutes: i32,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_duration() -> i32 {
    30
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceFilter {
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_defaults_to_thirty_minutes() {
        let p: ServicePayload = serde_json::from_str(r#"{"name":"Escova","price":50}"#).unwrap();
        assert_eq!(p.duration_minutes, 30);
        assert!(p.active);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_price_and_zero_duration_are_rejected() {
        let p: ServicePayload =
            serde_json::from_str(r#"{"name":"Escova","price":-1,"durationMinutes":0}"#).unwrap();
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("duration_minutes"));
    }
}
