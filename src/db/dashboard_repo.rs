// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::dashboard::{DailyCounters, MonthAppointmentRow, RecentClient, UpcomingAppointment},
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Contadores do dia em uma única ida ao banco
    pub async fn daily_counters<'e, E>(&self, executor: E, today: NaiveDate) -> Result<DailyCounters, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counters = sqlx::query_as::<_, DailyCounters>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM appointments WHERE date = $1 AND status = 'confirmed') AS confirmed_today,
                (SELECT COUNT(*) FROM appointments WHERE date = $1 AND status = 'completed') AS completed_today,
                (SELECT COUNT(*) FROM appointments
                  WHERE date = $1 AND status IN ('pending', 'confirmed')) AS upcoming_today,
                (SELECT COUNT(*) FROM clients) AS total_clients,
                (SELECT COUNT(*) FROM current_stock WHERE active AND low_stock) AS low_stock_products
            "#,
        )
        .bind(today)
        .fetch_one(executor)
        .await?;
        Ok(counters)
    }

    // 2. Agendamentos do período com serviço (receita e ranking são calculados no service)
    pub async fn month_appointments<'e, E>(
        &self,
        executor: E,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthAppointmentRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MonthAppointmentRow>(
            r#"
            SELECT a.date, a.status, sv.name AS service_name, sv.price AS service_price
            FROM appointments a
            LEFT JOIN services sv ON sv.id = a.service_id
            WHERE a.date BETWEEN $1 AND $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 3. Próximos atendimentos
    pub async fn upcoming<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
        limit: i64,
    ) -> Result<Vec<UpcomingAppointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, UpcomingAppointment>(
            r#"
            SELECT a.id, a.date, a.start_time, a.status,
                   c.name AS client_name,
                   sv.name AS service_name,
                   sv.price AS service_price
            FROM appointments a
            LEFT JOIN clients c ON c.id = a.client_id
            LEFT JOIN services sv ON sv.id = a.service_id
            WHERE a.date >= $1 AND a.status IN ('pending', 'confirmed')
            ORDER BY a.date ASC, a.start_time ASC
            LIMIT $2
            "#,
        )
        .bind(today)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 4. Clientes cadastrados mais recentemente
    pub async fn recent_clients<'e, E>(&self, executor: E, limit: i64) -> Result<Vec<RecentClient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, RecentClient>(
            "SELECT id, name, phone, created_at FROM clients ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
