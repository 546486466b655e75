// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Service, ServiceFilter, ServicePayload},
};

// Catálogo de serviços (tabela `services`)
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &ServiceFilter) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT * FROM services
            WHERE ($1::BOOLEAN IS NULL OR active = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.active)
        .fetch_all(executor)
        .await?;
        Ok(services)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ServicePayload) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, description, price, duration_minutes, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.duration_minutes)
        .bind(payload.active)
        .fetch_one(executor)
        .await?;
        Ok(service)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ServicePayload,
    ) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $2, description = $3, price = $4, duration_minutes = $5,
                active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.duration_minutes)
        .bind(payload.active)
        .fetch_optional(executor)
        .await?;
        Ok(service)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
