// src/services/staff_service.rs

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentRepository, StaffRepository},
    models::staff::{StaffDetail, StaffFilter, StaffMember, StaffPayload},
};

#[derive(Clone)]
pub struct StaffService {
    repo: StaffRepository,
    appointment_repo: AppointmentRepository,
}

impl StaffService {
    pub fn new(repo: StaffRepository, appointment_repo: AppointmentRepository) -> Self {
        Self { repo, appointment_repo }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &StaffFilter) -> Result<Vec<StaffMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    /// Ficha do colaborador + agenda a partir de hoje.
    pub async fn get_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<StaffDetail, AppError> {
        let staff = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or(AppError::ResourceNotFound("staff"))?;

        let upcoming_appointments = self
            .appointment_repo
            .upcoming_for_staff(&mut *conn, id, time::today())
            .await?;

        Ok(StaffDetail { staff, upcoming_appointments })
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &StaffPayload) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create(executor, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &StaffPayload,
    ) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("staff"))
    }

    // O histórico de agendamentos fica, com staff_id NULL.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::ResourceNotFound("staff"));
        }
        Ok(())
    }
}
