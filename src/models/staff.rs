// src/models/staff.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{appointment::AppointmentListEntry, default_true, empty_as_none};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    #[schema(example = "Ana Lima")]
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub photo_url: Option<String>,
    #[schema(example = "Corte, coloração")]
    pub specialties: Option<String>,
    pub active: bool,
    pub hired_on: Option<NaiveDate>,
    /// Cor usada para destacar o colaborador na agenda
    #[schema(example = "#7C3AED")]
    pub calendar_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "A URL da foto é inválida."))]
    pub photo_url: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub specialties: Option<String>,

    pub hired_on: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(custom(function = "validate_hex_color"))]
    pub calendar_color: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("hex_color");
    err.message = Some("A cor deve estar no formato #RRGGBB.".into());
    Err(err)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffFilter {
    pub active: Option<bool>,
}

// Ficha do colaborador com os próximos atendimentos.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffDetail {
    #[serde(flatten)]
    pub staff: StaffMember,
    pub upcoming_appointments: Vec<AppointmentListEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(color: Option<&str>) -> StaffPayload {
        StaffPayload {
            name: "Ana".into(),
            email: None,
            phone: "1199999".into(),
            photo_url: None,
            specialties: None,
            hired_on: None,
            calendar_color: color.map(String::from),
            active: true,
        }
    }

    #[test]
    fn accepts_hex_colors() {
        assert!(payload(Some("#a1B2c3")).validate().is_ok());
        assert!(payload(None).validate().is_ok());
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in ["a1b2c3", "#12345", "#GGGGGG", "#1234567"] {
            let errors = payload(Some(bad)).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("calendar_color"), "{bad}");
        }
    }
}
