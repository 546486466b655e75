// src/services/schedule_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::ScheduleRepository,
    models::schedule::{BlockFilter, BusinessHours, BusinessHoursPayload, ScheduleBlock, ScheduleBlockPayload},
};

#[derive(Clone)]
pub struct ScheduleService {
    repo: ScheduleRepository,
}

impl ScheduleService {
    pub fn new(repo: ScheduleRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  1. HORÁRIOS DE FUNCIONAMENTO
    // =========================================================================

    pub async fn list_hours<'e, E>(&self, executor: E) -> Result<Vec<BusinessHours>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_hours(executor).await
    }

    pub async fn get_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<BusinessHours, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_hours(executor, id)
            .await?
            .ok_or(AppError::ResourceNotFound("business_hours"))
    }

    pub async fn create_hours<'e, E>(
        &self,
        executor: E,
        payload: &BusinessHoursPayload,
    ) -> Result<BusinessHours, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_hours(executor, payload).await
    }

    pub async fn update_hours<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &BusinessHoursPayload,
    ) -> Result<BusinessHours, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_hours(executor, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("business_hours"))
    }

    pub async fn toggle_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<BusinessHours, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .toggle_hours(executor, id)
            .await?
            .ok_or(AppError::ResourceNotFound("business_hours"))
    }

    pub async fn delete_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_hours(executor, id).await? {
            return Err(AppError::ResourceNotFound("business_hours"));
        }
        Ok(())
    }

    // =========================================================================
    //  2. BLOQUEIOS DE AGENDA
    // =========================================================================

    pub async fn list_blocks<'e, E>(&self, executor: E, filter: &BlockFilter) -> Result<Vec<ScheduleBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let from = effective_from(filter, time::today());
        self.repo.list_blocks(executor, from, filter.to).await
    }

    pub async fn get_block<'e, E>(&self, executor: E, id: Uuid) -> Result<ScheduleBlock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_block(executor, id)
            .await?
            .ok_or(AppError::ResourceNotFound("schedule_block"))
    }

    pub async fn create_block<'e, E>(
        &self,
        executor: E,
        payload: &ScheduleBlockPayload,
    ) -> Result<ScheduleBlock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let block = self.repo.create_block(executor, payload).await?;
        tracing::info!("⛔ Bloqueio de agenda criado para {} ({:?})", block.date, block.kind);
        Ok(block)
    }

    pub async fn update_block<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ScheduleBlockPayload,
    ) -> Result<ScheduleBlock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_block(executor, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("schedule_block"))
    }

    pub async fn delete_block<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_block(executor, id).await? {
            return Err(AppError::ResourceNotFound("schedule_block"));
        }
        Ok(())
    }
}

// `upcoming` corta tudo antes de hoje, mesmo que `from` seja mais antigo.
fn effective_from(filter: &BlockFilter, today: chrono::NaiveDate) -> Option<chrono::NaiveDate> {
    match (filter.upcoming, filter.from) {
        (true, Some(from)) => Some(from.max(today)),
        (true, None) => Some(today),
        (false, from) => from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn upcoming_flag_moves_lower_bound_to_today() {
        let today = d(15);
        let all = BlockFilter::default();
        assert_eq!(effective_from(&all, today), None);

        let upcoming = BlockFilter { upcoming: true, ..Default::default() };
        assert_eq!(effective_from(&upcoming, today), Some(today));

        let old_from = BlockFilter { upcoming: true, from: Some(d(1)), to: None };
        assert_eq!(effective_from(&old_from, today), Some(today));

        let future_from = BlockFilter { upcoming: true, from: Some(d(20)), to: None };
        assert_eq!(effective_from(&future_from, today), Some(d(20)));

        let plain = BlockFilter { upcoming: false, from: Some(d(3)), to: None };
        assert_eq!(effective_from(&plain, today), Some(d(3)));
    }
}
