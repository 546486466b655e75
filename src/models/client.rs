// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, empty_as_none};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "(11) 98888-7777")]
    pub phone: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Mesmo payload para criação e edição (o formulário é o mesmo).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClientFilter {
    pub active: Option<bool>,
    /// Busca por nome ou telefone
    pub search: Option<String>,
}
