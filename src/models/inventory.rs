// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{catalog::validate_not_negative, default_true, empty_as_none};

// --- 1. Produtos (catálogo) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Shampoo hidratante 300ml")]
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[schema(example = "un")]
    pub unit: String,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    /// Abaixo (ou igual) a este saldo o produto entra em alerta
    pub min_stock: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,

    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 10, message = "Unidade de medida inválida."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub purchase_price: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub min_stock: Decimal,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_unit() -> String {
    "un".to_string()
}

// --- 2. Movimentações ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "stock_movement_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StockMovementKind {
    In,  // Entrada
    Out, // Saída
}

impl StockMovementKind {
    /// Motivos sugeridos no formulário para cada tipo de movimentação.
    pub fn suggested_reasons(self) -> &'static [&'static str] {
        match self {
            StockMovementKind::In => &["Compra", "Doação", "Devolução", "Ajuste", "Transferência", "Outro"],
            StockMovementKind::Out => &["Venda", "Consumo", "Perda", "Doação", "Ajuste", "Transferência", "Outro"],
        }
    }

    /// Efeito da movimentação no saldo.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            StockMovementKind::In => quantity,
            StockMovementKind::Out => -quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: StockMovementKind,
    pub quantity: Decimal,
    #[schema(example = "Compra")]
    pub reason: String,
    pub notes: Option<String>,
    pub appointment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Linha do histórico com o nome/unidade do produto.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub movement: StockMovement,
    pub product_name: String,
    pub product_unit: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementPayload {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    #[schema(example = "Compra")]
    pub reason: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub kind: Option<StockMovementKind>,
    /// Padrão 100, máximo 500
    pub limit: Option<i64>,
}

impl MovementFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}

// --- 3. Saldo atual (view current_stock) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStock {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub sale_price: Option<Decimal>,
    pub min_stock: Decimal,
    pub active: bool,
    pub balance: Decimal,
    pub low_stock: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub product_count: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

impl StockSummary {
    pub fn from_levels(levels: &[CurrentStock]) -> Self {
        Self {
            product_count: levels.len(),
            low_stock_count: levels.iter().filter(|l| l.low_stock).count(),
            out_of_stock_count: levels.iter().filter(|l| l.balance <= Decimal::ZERO).count(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub summary: StockSummary,
    pub products: Vec<CurrentStock>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementReasons {
    #[serde(rename = "in")]
    pub entries: Vec<String>,
    #[serde(rename = "out")]
    pub exits: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(balance: i64, min: i64) -> CurrentStock {
        let balance = Decimal::new(balance, 0);
        let min_stock = Decimal::new(min, 0);
        CurrentStock {
            id: Uuid::new_v4(),
            name: "x".into(),
            unit: "un".into(),
            sale_price: None,
            min_stock,
            active: true,
            balance,
            low_stock: balance <= min_stock,
        }
    }

    #[test]
    fn summary_counts_low_and_empty_products() {
        let levels = vec![level(10, 2), level(2, 2), level(0, 0), level(5, 1)];
        let summary = StockSummary::from_levels(&levels);
        assert_eq!(
            summary,
            StockSummary { product_count: 4, low_stock_count: 2, out_of_stock_count: 1 }
        );
    }

    #[test]
    fn movement_sign_follows_kind() {
        let q = Decimal::new(3, 0);
        assert_eq!(StockMovementKind::In.signed(q), q);
        assert_eq!(StockMovementKind::Out.signed(q), -q);
    }

    #[test]
    fn sale_is_a_suggested_exit_reason() {
        assert!(StockMovementKind::Out.suggested_reasons().contains(&"Venda"));
        assert!(!StockMovementKind::In.suggested_reasons().contains(&"Venda"));
    }

    #[test]
    fn movement_limit_is_clamped() {
        assert_eq!(MovementFilter::default().effective_limit(), 100);
        let big = MovementFilter { limit: Some(10_000), ..Default::default() };
        assert_eq!(big.effective_limit(), 500);
        let zero = MovementFilter { limit: Some(0), ..Default::default() };
        assert_eq!(zero.effective_limit(), 1);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let p = StockMovementPayload {
            product_id: Uuid::new_v4(),
            quantity: Decimal::ZERO,
            reason: "Compra".into(),
            notes: None,
        };
        assert!(p.validate().unwrap_err().field_errors().contains_key("quantity"));
    }
}
