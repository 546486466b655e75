// src/db/staff_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::staff::{StaffFilter, StaffMember, StaffPayload},
};

#[derive(Clone, Default)]
pub struct StaffRepository;

impl StaffRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &StaffFilter) -> Result<Vec<StaffMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let staff = sqlx::query_as::<_, StaffMember>(
            r#"
            SELECT * FROM staff_members
            WHERE ($1::BOOLEAN IS NULL OR active = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.active)
        .fetch_all(executor)
        .await?;
        Ok(staff)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<StaffMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, StaffMember>("SELECT * FROM staff_members WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(member)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &StaffPayload) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, StaffMember>(
            r#"
            INSERT INTO staff_members
                (name, email, phone, photo_url, specialties, hired_on, calendar_color, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.email.as_deref())
        .bind(payload.phone.trim())
        .bind(payload.photo_url.as_deref())
        .bind(payload.specialties.as_deref())
        .bind(payload.hired_on)
        .bind(payload.calendar_color.as_deref())
        .bind(payload.active)
        .fetch_one(executor)
        .await?;
        Ok(member)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &StaffPayload,
    ) -> Result<Option<StaffMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, StaffMember>(
            r#"
            UPDATE staff_members
            SET name = $2, email = $3, phone = $4, photo_url = $5, specialties = $6,
                hired_on = $7, calendar_color = $8, active = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.email.as_deref())
        .bind(payload.phone.trim())
        .bind(payload.photo_url.as_deref())
        .bind(payload.specialties.as_deref())
        .bind(payload.hired_on)
        .bind(payload.calendar_color.as_deref())
        .bind(payload.active)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM staff_members WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
