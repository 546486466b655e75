// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::inventory::{
        CurrentStock, MovementFilter, Product, ProductPayload, StockMovement, StockMovementEntry,
        StockMovementKind,
    },
};

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Produtos (catálogo)
    // ---

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Trava a linha do produto até o fim da transação.
    /// Duas saídas simultâneas do mesmo produto ficam serializadas aqui.
    pub async fn lock_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(&self, executor: E, payload: &ProductPayload) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, description, barcode, brand, category, unit,
                 purchase_price, sale_price, min_stock, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .bind(payload.barcode.as_deref())
        .bind(payload.brand.as_deref())
        .bind(payload.category.as_deref())
        .bind(payload.unit.trim())
        .bind(payload.purchase_price)
        .bind(payload.sale_price)
        .bind(payload.min_stock)
        .bind(payload.active)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, barcode = $4, brand = $5, category = $6,
                unit = $7, purchase_price = $8, sale_price = $9, min_stock = $10,
                active = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .bind(payload.barcode.as_deref())
        .bind(payload.brand.as_deref())
        .bind(payload.category.as_deref())
        .bind(payload.unit.trim())
        .bind(payload.purchase_price)
        .bind(payload.sale_price)
        .bind(payload.min_stock)
        .bind(payload.active)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Movimentações e itens de agendamento usam RESTRICT: a FK barra o DELETE.
    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ProductInUse;
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Saldo (view current_stock)
    // ---

    pub async fn current_stock<'e, E>(&self, executor: E) -> Result<Vec<CurrentStock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let levels = sqlx::query_as::<_, CurrentStock>(
            "SELECT * FROM current_stock WHERE active ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(levels)
    }

    /// Produtos que podem ser adicionados a um agendamento.
    pub async fn available_products<'e, E>(&self, executor: E) -> Result<Vec<CurrentStock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let levels = sqlx::query_as::<_, CurrentStock>(
            "SELECT * FROM current_stock WHERE active AND balance > 0 ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(levels)
    }

    pub async fn balance<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN kind = 'in' THEN quantity ELSE -quantity END), 0)
            FROM stock_movements
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    // ---
    // Movimentações
    // ---

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        kind: StockMovementKind,
        quantity: Decimal,
        reason: &str,
        notes: Option<&str>,
        appointment_id: Option<Uuid>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, kind, quantity, reason, notes, appointment_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(kind)
        .bind(quantity)
        .bind(reason)
        .bind(notes)
        .bind(appointment_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, |_| None))
    }

    /// Histórico com nome e unidade do produto, mais recentes primeiro.
    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<StockMovementEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovementEntry>(
            r#"
            SELECT m.*, p.name AS product_name, p.unit AS product_unit
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            WHERE ($1::UUID IS NULL OR m.product_id = $1)
              AND ($2::stock_movement_kind IS NULL OR m.kind = $2)
            ORDER BY m.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.kind)
        .bind(filter.effective_limit())
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    /// Remove as baixas geradas por um agendamento. Retorna quantas foram removidas.
    pub async fn delete_appointment_movements<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stock_movements WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
