// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Erros de domínio. Cada camada (repo, service) devolve AppError;
// o handler converte para ApiError com a mensagem no idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0} não encontrado")]
    ResourceNotFound(&'static str),

    #[error("Referência inválida: {0}")]
    InvalidReference(&'static str),

    #[error("Produto possui movimentações de estoque")]
    ProductInUse,

    #[error("Já existe horário para o dia {0}")]
    BusinessHoursAlreadyExists(i16),

    #[error("Estoque insuficiente para {product}: disponível {available}, solicitado {requested}")]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Produto {0} informado mais de uma vez")]
    DuplicateProduct(Uuid),

    #[error("Conflito com o agendamento {0}")]
    AppointmentConflict(Uuid),

    #[error("Horário bloqueado na agenda")]
    ScheduleBlocked(Uuid),

    #[error("O agendamento não pode atravessar a meia-noite")]
    CrossesMidnight,

    #[error("Hora de fim obrigatória quando não há serviço")]
    EndTimeRequired,

    #[error("Variante para erros de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto do erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Atalho para erros de validação de um único campo, construídos fora do `validator`.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let pt = locale.is_portuguese();
        let msg = |pt_msg: &str, en_msg: &str| {
            if pt { pt_msg.to_string() } else { en_msg.to_string() }
        };

        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: msg("Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::EmailAlreadyExists => ApiError::new(
                StatusCode::CONFLICT,
                msg("Este e-mail já está em uso.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                msg("E-mail ou senha inválidos.", "Invalid e-mail or password."),
            ),
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                msg(
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
            ),
            AppError::UserNotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                msg("Usuário não encontrado.", "User not found."),
            ),
            AppError::ResourceNotFound(resource) => ApiError {
                status: StatusCode::NOT_FOUND,
                error: msg("Registro não encontrado.", "Record not found."),
                details: Some(json!({ "resource": resource })),
            },
            AppError::InvalidReference(field) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: msg(
                    "Um registro referenciado não existe.",
                    "A referenced record does not exist.",
                ),
                details: Some(json!({ "field": field })),
            },
            AppError::ProductInUse => ApiError::new(
                StatusCode::CONFLICT,
                msg(
                    "O produto possui movimentações ou agendamentos e não pode ser excluído.",
                    "The product has stock movements or appointments and cannot be deleted.",
                ),
            ),
            AppError::BusinessHoursAlreadyExists(weekday) => ApiError {
                status: StatusCode::CONFLICT,
                error: msg(
                    "Já existe um horário cadastrado para este dia da semana.",
                    "Business hours already exist for this weekday.",
                ),
                details: Some(json!({ "weekday": weekday })),
            },
            AppError::InsufficientStock { product, available, requested } => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: msg("Estoque insuficiente.", "Insufficient stock."),
                details: Some(json!({
                    "product": product,
                    "available": available,
                    "requested": requested,
                })),
            },
            AppError::DuplicateProduct(product_id) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: msg("Produto já foi adicionado.", "Product was already added."),
                details: Some(json!({ "productId": product_id })),
            },
            AppError::AppointmentConflict(other) => ApiError {
                status: StatusCode::CONFLICT,
                error: msg(
                    "O colaborador já possui um agendamento neste horário.",
                    "The staff member already has an appointment at this time.",
                ),
                details: Some(json!({ "conflictingAppointmentId": other })),
            },
            AppError::ScheduleBlocked(block_id) => ApiError {
                status: StatusCode::CONFLICT,
                error: msg(
                    "A agenda está bloqueada neste horário.",
                    "The schedule is blocked at this time.",
                ),
                details: Some(json!({ "scheduleBlockId": block_id })),
            },
            AppError::CrossesMidnight => ApiError::new(
                StatusCode::BAD_REQUEST,
                msg(
                    "O agendamento não pode terminar no dia seguinte.",
                    "The appointment cannot end on the following day.",
                ),
            ),
            AppError::EndTimeRequired => ApiError::new(
                StatusCode::BAD_REQUEST,
                msg(
                    "Informe a hora de fim ou selecione um serviço.",
                    "Provide an end time or select a service.",
                ),
            ),

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    msg("Ocorreu um erro inesperado.", "An unexpected error occurred."),
                )
            }
        }
    }
}

// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converte violações de integridade do Postgres em erros de domínio.
/// `on_unique` decide o erro para UNIQUE; FK vira `InvalidReference`.
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    on_unique: impl FnOnce(&str) -> Option<AppError>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            if let Some(mapped) = on_unique(constraint) {
                return mapped;
            }
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference(foreign_key_field(constraint));
        }
    }
    e.into()
}

fn foreign_key_field(constraint: &str) -> &'static str {
    if constraint.contains("client_id") {
        "clientId"
    } else if constraint.contains("staff_id") {
        "staffId"
    } else if constraint.contains("service_id") {
        "serviceId"
    } else if constraint.contains("product_id") {
        "productId"
    } else if constraint.contains("appointment_id") {
        "appointmentId"
    } else {
        "id"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let api = AppError::field("endTime", "required", "Hora de fim obrigatória.").to_api_error(&pt());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["endTime"][0], "Hora de fim obrigatória.");
    }

    #[test]
    fn insufficient_stock_is_unprocessable() {
        let api = AppError::InsufficientStock {
            product: "Shampoo".into(),
            available: Decimal::new(2, 0),
            requested: Decimal::new(5, 0),
        }
        .to_api_error(&pt());
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.details.unwrap()["product"], "Shampoo");
    }

    #[test]
    fn messages_follow_locale() {
        let en = Locale("en".to_string());
        assert_eq!(AppError::InvalidToken.to_api_error(&en).error, "Missing or invalid authentication token.");
        assert_eq!(
            AppError::InvalidToken.to_api_error(&pt()).error,
            "Token de autenticação inválido ou ausente."
        );
    }

    #[test]
    fn conflicts_map_to_409() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::AppointmentConflict(id).to_api_error(&pt()).status, StatusCode::CONFLICT);
        assert_eq!(AppError::ScheduleBlocked(id).to_api_error(&pt()).status, StatusCode::CONFLICT);
        assert_eq!(AppError::ProductInUse.to_api_error(&pt()).status, StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo")).to_api_error(&pt());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.details.is_none());
        assert!(!api.error.contains("segredo"));
    }

    #[test]
    fn foreign_key_fields_are_named() {
        assert_eq!(foreign_key_field("appointments_client_id_fkey"), "clientId");
        assert_eq!(foreign_key_field("stock_movements_product_id_fkey"), "productId");
        assert_eq!(foreign_key_field("whatever"), "id");
    }
}
