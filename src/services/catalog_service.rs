// src/services/catalog_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Service, ServiceFilter, ServicePayload},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &ServiceFilter) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::ResourceNotFound("service"))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ServicePayload) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create(executor, payload).await
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &ServicePayload) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("service"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::ResourceNotFound("service"));
        }
        Ok(())
    }
}
