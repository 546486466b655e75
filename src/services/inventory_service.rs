// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{
        MovementFilter, MovementReasons, Product, ProductPayload, StockMovement, StockMovementEntry,
        StockMovementKind, StockMovementPayload, StockOverview, StockSummary,
    },
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    // =========================================================================
    //  1. PRODUTOS
    // =========================================================================

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo.list_products(executor).await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .find_product(executor, id)
            .await?
            .ok_or(AppError::ResourceNotFound("product"))
    }

    pub async fn create_product<'e, E>(&self, executor: E, payload: &ProductPayload) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo.create_product(executor, payload).await
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .update_product(executor, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("product"))
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.inventory_repo.delete_product(executor, id).await? {
            return Err(AppError::ResourceNotFound("product"));
        }
        Ok(())
    }

    // =========================================================================
    //  2. SALDO E HISTÓRICO
    // =========================================================================

    pub async fn overview<'e, E>(&self, executor: E) -> Result<StockOverview, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = self.inventory_repo.current_stock(executor).await?;
        let summary = StockSummary::from_levels(&products);
        Ok(StockOverview { summary, products })
    }

    pub async fn movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<StockMovementEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo.list_movements(executor, filter).await
    }

    pub fn reasons(&self) -> MovementReasons {
        let owned = |kind: StockMovementKind| {
            kind.suggested_reasons().iter().map(|r| r.to_string()).collect()
        };
        MovementReasons {
            entries: owned(StockMovementKind::In),
            exits: owned(StockMovementKind::Out),
        }
    }

    // =========================================================================
    //  3. ENTRADAS E SAÍDAS
    // =========================================================================

    /// Registra a movimentação numa transação com a linha do produto travada.
    /// Saídas acima do saldo são recusadas.
    pub async fn record_movement<'e, A>(
        &self,
        conn: A,
        kind: StockMovementKind,
        payload: &StockMovementPayload,
    ) -> Result<StockMovement, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let product = self
            .inventory_repo
            .lock_product(&mut *tx, payload.product_id)
            .await?
            .ok_or(AppError::ResourceNotFound("product"))?;

        let balance = self.inventory_repo.balance(&mut *tx, product.id).await?;
        ensure_balance(&product.name, balance, kind, payload.quantity)?;

        let movement = self
            .inventory_repo
            .insert_movement(
                &mut *tx,
                product.id,
                kind,
                payload.quantity,
                payload.reason.trim(),
                payload.notes.as_deref(),
                None,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📦 Movimentação {:?} de {} {} em '{}' ({})",
            kind,
            payload.quantity,
            product.unit,
            product.name,
            movement.reason
        );
        Ok(movement)
    }
}

/// O saldo depois da movimentação não pode ficar negativo.
pub(crate) fn ensure_balance(
    product_name: &str,
    balance: Decimal,
    kind: StockMovementKind,
    quantity: Decimal,
) -> Result<(), AppError> {
    if balance + kind.signed(quantity) < Decimal::ZERO {
        return Err(AppError::InsufficientStock {
            product: product_name.to_string(),
            available: balance.max(Decimal::ZERO),
            requested: quantity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_never_fail_the_balance_check() {
        assert!(ensure_balance("Gel", Decimal::ZERO, StockMovementKind::In, Decimal::new(5, 0)).is_ok());
    }

    #[test]
    fn exits_up_to_the_balance_are_allowed() {
        let balance = Decimal::new(45, 1); // 4.5
        assert!(ensure_balance("Gel", balance, StockMovementKind::Out, Decimal::new(45, 1)).is_ok());
        assert!(ensure_balance("Gel", balance, StockMovementKind::Out, Decimal::new(1, 0)).is_ok());
    }

    #[test]
    fn exits_above_the_balance_report_available_quantity() {
        let err = ensure_balance("Gel", Decimal::new(2, 0), StockMovementKind::Out, Decimal::new(3, 0))
            .unwrap_err();
        match err {
            AppError::InsufficientStock { product, available, requested } => {
                assert_eq!(product, "Gel");
                assert_eq!(available, Decimal::new(2, 0));
                assert_eq!(requested, Decimal::new(3, 0));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn reasons_are_split_by_kind() {
        let service = InventoryService::new(InventoryRepository::new());
        let reasons = service.reasons();
        assert_eq!(reasons.entries.first().map(String::as_str), Some("Compra"));
        assert!(reasons.exits.iter().any(|r| r == "Venda"));

        let json = serde_json::to_value(&reasons).unwrap();
        assert!(json["in"].is_array());
        assert!(json["out"].is_array());
    }
}
