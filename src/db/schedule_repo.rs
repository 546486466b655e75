// src/db/schedule_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::schedule::{BusinessHours, BusinessHoursPayload, ScheduleBlock, ScheduleBlockPayload},
};

// Horários de funcionamento e bloqueios de agenda
#[derive(Clone, Default)]
pub struct ScheduleRepository;

impl ScheduleRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Horários de funcionamento
    // ---

    pub async fn list_hours<'e, E>(&self, executor: E) -> Result<Vec<BusinessHours>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hours = sqlx::query_as::<_, BusinessHours>("SELECT * FROM business_hours ORDER BY weekday ASC")
            .fetch_all(executor)
            .await?;
        Ok(hours)
    }

    pub async fn find_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<BusinessHours>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hours = sqlx::query_as::<_, BusinessHours>("SELECT * FROM business_hours WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(hours)
    }

    pub async fn create_hours<'e, E>(
        &self,
        executor: E,
        payload: &BusinessHoursPayload,
    ) -> Result<BusinessHours, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BusinessHours>(
            r#"
            INSERT INTO business_hours (weekday, opens_at, closes_at, break_start, break_end, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.weekday)
        .bind(payload.opens_at)
        .bind(payload.closes_at)
        .bind(payload.break_start)
        .bind(payload.break_end)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(|e| weekday_conflict(e, payload.weekday))
    }

    pub async fn update_hours<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &BusinessHoursPayload,
    ) -> Result<Option<BusinessHours>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BusinessHours>(
            r#"
            UPDATE business_hours
            SET weekday = $2, opens_at = $3, closes_at = $4, break_start = $5,
                break_end = $6, active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.weekday)
        .bind(payload.opens_at)
        .bind(payload.closes_at)
        .bind(payload.break_start)
        .bind(payload.break_end)
        .bind(payload.active)
        .fetch_optional(executor)
        .await
        .map_err(|e| weekday_conflict(e, payload.weekday))
    }

    /// Inverte `active` e devolve o registro atualizado.
    pub async fn toggle_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<BusinessHours>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hours = sqlx::query_as::<_, BusinessHours>(
            "UPDATE business_hours SET active = NOT active, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(hours)
    }

    pub async fn delete_hours<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM business_hours WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Bloqueios
    // ---

    pub async fn list_blocks<'e, E>(
        &self,
        executor: E,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // NULLS FIRST: bloqueios de dia inteiro aparecem antes dos parciais.
        let blocks = sqlx::query_as::<_, ScheduleBlock>(
            r#"
            SELECT * FROM schedule_blocks
            WHERE ($1::DATE IS NULL OR date >= $1)
              AND ($2::DATE IS NULL OR date <= $2)
            ORDER BY date ASC, start_time ASC NULLS FIRST
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(blocks)
    }

    pub async fn blocks_on<'e, E>(&self, executor: E, date: NaiveDate) -> Result<Vec<ScheduleBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.list_blocks(executor, Some(date), Some(date)).await
    }

    pub async fn find_block<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ScheduleBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let block = sqlx::query_as::<_, ScheduleBlock>("SELECT * FROM schedule_blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(block)
    }

    pub async fn create_block<'e, E>(
        &self,
        executor: E,
        payload: &ScheduleBlockPayload,
    ) -> Result<ScheduleBlock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let block = sqlx::query_as::<_, ScheduleBlock>(
            r#"
            INSERT INTO schedule_blocks (date, start_time, end_time, kind, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.date)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.kind)
        .bind(payload.reason.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(block)
    }

    pub async fn update_block<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ScheduleBlockPayload,
    ) -> Result<Option<ScheduleBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let block = sqlx::query_as::<_, ScheduleBlock>(
            r#"
            UPDATE schedule_blocks
            SET date = $2, start_time = $3, end_time = $4, kind = $5, reason = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.date)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.kind)
        .bind(payload.reason.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(block)
    }

    pub async fn delete_block<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM schedule_blocks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Um registro por dia da semana (UNIQUE em weekday).
fn weekday_conflict(e: sqlx::Error, weekday: i16) -> AppError {
    map_constraint_error(e, |constraint| {
        constraint
            .contains("weekday")
            .then_some(AppError::BusinessHoursAlreadyExists(weekday))
    })
}
