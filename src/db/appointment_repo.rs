// src/db/appointment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::appointment::{
        Appointment, AppointmentFilter, AppointmentListEntry, AppointmentProductLine,
        AppointmentStatus, AppointmentValues,
    },
};

// Agendamento + nomes das referências (LEFT JOIN: as FKs podem ter virado NULL).
const ENTRY_SELECT: &str = r#"
    SELECT a.*,
           c.name AS client_name,
           c.phone AS client_phone,
           st.name AS staff_name,
           sv.name AS service_name,
           sv.duration_minutes AS service_duration_minutes,
           sv.price AS service_price
    FROM appointments a
    LEFT JOIN clients c ON c.id = a.client_id
    LEFT JOIN staff_members st ON st.id = a.staff_id
    LEFT JOIN services sv ON sv.id = a.service_id
"#;

#[derive(Clone, Default)]
pub struct AppointmentRepository;

impl AppointmentRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"{ENTRY_SELECT}
            WHERE ($1::DATE IS NULL OR a.date >= $1)
              AND ($2::DATE IS NULL OR a.date <= $2)
              AND ($3::appointment_status IS NULL OR a.status = $3)
              AND ($4::UUID IS NULL OR a.staff_id = $4)
              AND ($5::UUID IS NULL OR a.client_id = $5)
            ORDER BY a.date ASC, a.start_time ASC
            "#
        );
        let entries = sqlx::query_as::<_, AppointmentListEntry>(&sql)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.staff_id)
            .bind(filter.client_id)
            .fetch_all(executor)
            .await?;
        Ok(entries)
    }

    pub async fn find_entry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<AppointmentListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{ENTRY_SELECT} WHERE a.id = $1");
        let entry = sqlx::query_as::<_, AppointmentListEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    /// Lê e trava o agendamento (usado antes de editar ou mudar status).
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(appointment)
    }

    /// Próximos atendimentos (pendentes/confirmados) de um colaborador.
    pub async fn upcoming_for_staff<'e, E>(
        &self,
        executor: E,
        staff_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<AppointmentListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"{ENTRY_SELECT}
            WHERE a.staff_id = $1
              AND a.date >= $2
              AND a.status IN ('pending', 'confirmed')
            ORDER BY a.date ASC, a.start_time ASC
            "#
        );
        let entries = sqlx::query_as::<_, AppointmentListEntry>(&sql)
            .bind(staff_id)
            .bind(from)
            .fetch_all(executor)
            .await?;
        Ok(entries)
    }

    /// Agendamentos que ocupam a agenda do colaborador no dia.
    /// Serializa as gravações do mesmo colaborador no mesmo dia até o fim da transação.
    pub async fn lock_staff_day<'e, E>(
        &self,
        executor: E,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::TEXT || '|' || $2::TEXT, 0))")
            .bind(staff_id)
            .bind(date)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn staff_day<'e, E>(
        &self,
        executor: E,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE staff_id = $1 AND date = $2 AND status <> 'cancelled'
            ORDER BY start_time ASC
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .fetch_all(executor)
        .await?;
        Ok(appointments)
    }

    pub async fn product_lines<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProductLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, AppointmentProductLine>(
            r#"
            SELECT ap.product_id,
                   p.name AS product_name,
                   p.unit,
                   ap.quantity,
                   COALESCE(p.sale_price, 0) AS unit_price,
                   ap.quantity * COALESCE(p.sale_price, 0) AS subtotal
            FROM appointment_products ap
            JOIN products p ON p.id = ap.product_id
            WHERE ap.appointment_id = $1
            ORDER BY p.name ASC
            "#,
        )
        .bind(appointment_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    // ---
    // Escrita (sempre dentro da transação do service)
    // ---

    pub async fn insert<'e, E>(&self, executor: E, values: &AppointmentValues) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments
                (date, start_time, end_time, client_id, staff_id, service_id,
                 status, total_amount, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(values.date)
        .bind(values.start_time)
        .bind(values.end_time)
        .bind(values.client_id)
        .bind(values.staff_id)
        .bind(values.service_id)
        .bind(values.status)
        .bind(values.total_amount)
        .bind(values.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, |_| None))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        values: &AppointmentValues,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET date = $2, start_time = $3, end_time = $4, client_id = $5, staff_id = $6,
                service_id = $7, status = $8, total_amount = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(values.date)
        .bind(values.start_time)
        .bind(values.end_time)
        .bind(values.client_id)
        .bind(values.staff_id)
        .bind(values.service_id)
        .bind(values.status)
        .bind(values.total_amount)
        .bind(values.notes.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, |_| None))
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(appointment)
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, appointment_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM appointment_products WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Grava todas as linhas de uma vez (UNNEST dos dois arrays).
    pub async fn insert_lines<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
        lines: &[(Uuid, Decimal)],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if lines.is_empty() {
            return Ok(());
        }
        let (product_ids, quantities): (Vec<Uuid>, Vec<Decimal>) = lines.iter().copied().unzip();

        sqlx::query(
            r#"
            INSERT INTO appointment_products (appointment_id, product_id, quantity)
            SELECT $1, line.product_id, line.quantity
            FROM UNNEST($2::UUID[], $3::NUMERIC[]) AS line(product_id, quantity)
            "#,
        )
        .bind(appointment_id)
        .bind(product_ids)
        .bind(quantities)
        .execute(executor)
        .await
        .map_err(|e| map_constraint_error(e, |_| None))?;
        Ok(())
    }

    /// Linhas do agendamento (cascade) vão junto.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
