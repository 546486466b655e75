// src/services/appointment_service.rs

use std::collections::HashSet;

use chrono::{Duration, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AppointmentRepository, CatalogRepository, ClientRepository, InventoryRepository,
        ScheduleRepository, StaffRepository,
    },
    models::{
        appointment::{
            Appointment, AppointmentDetail, AppointmentFilter, AppointmentListEntry, AppointmentPayload,
            AppointmentStatus, AppointmentValues, FormOptions, ProductLinePayload,
        },
        catalog::ServiceFilter,
        inventory::StockMovementKind,
        schedule::ScheduleBlock,
        staff::StaffFilter,
    },
    services::inventory_service::ensure_balance,
};

const SALE_REASON: &str = "Venda";
const SALE_NOTE: &str = "Venda no agendamento";

// Linha de produto já conferida contra o estoque.
#[derive(Debug, Clone)]
struct ResolvedLine {
    product_id: Uuid,
    name: String,
    quantity: Decimal,
    sale_price: Option<Decimal>,
}

#[derive(Clone)]
pub struct AppointmentService {
    appointment_repo: AppointmentRepository,
    catalog_repo: CatalogRepository,
    inventory_repo: InventoryRepository,
    schedule_repo: ScheduleRepository,
    client_repo: ClientRepository,
    staff_repo: StaffRepository,
}

impl AppointmentService {
    pub fn new(
        appointment_repo: AppointmentRepository,
        catalog_repo: CatalogRepository,
        inventory_repo: InventoryRepository,
        schedule_repo: ScheduleRepository,
        client_repo: ClientRepository,
        staff_repo: StaffRepository,
    ) -> Self {
        Self {
            appointment_repo,
            catalog_repo,
            inventory_repo,
            schedule_repo,
            client_repo,
            staff_repo,
        }
    }

    // =========================================================================
    //  1. LEITURA
    // =========================================================================

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.appointment_repo.list(executor, filter).await
    }

    pub async fn get_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<AppointmentDetail, AppError> {
        self.load_detail(conn, id).await
    }

    /// Listas de referência do formulário (clientes, serviços, colaboradores, produtos com saldo).
    pub async fn form_options(&self, conn: &mut PgConnection) -> Result<FormOptions, AppError> {
        let clients = self.client_repo.list_active(&mut *conn).await?;
        let services = self
            .catalog_repo
            .list(&mut *conn, &ServiceFilter { active: Some(true) })
            .await?;
        let staff = self
            .staff_repo
            .list(&mut *conn, &StaffFilter { active: Some(true) })
            .await?;
        let products = self.inventory_repo.available_products(&mut *conn).await?;

        Ok(FormOptions { clients, services, staff, products })
    }

    // =========================================================================
    //  2. GRAVAÇÃO (criação e edição)
    // =========================================================================

    /// Grava o agendamento, as linhas de produto e a baixa de estoque numa só transação.
    /// `id = None` cria; `Some` edita.
    pub async fn save<'e, A>(
        &self,
        conn: A,
        id: Option<Uuid>,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let previous = match id {
            Some(id) => Some(
                self.appointment_repo
                    .lock(&mut *tx, id)
                    .await?
                    .ok_or(AppError::ResourceNotFound("appointment"))?,
            ),
            None => None,
        };

        // 1. Referências
        if let Some(client_id) = payload.client_id {
            self.client_repo
                .find_by_id(&mut *tx, client_id)
                .await?
                .ok_or(AppError::InvalidReference("clientId"))?;
        }
        if let Some(staff_id) = payload.staff_id {
            self.staff_repo
                .find_by_id(&mut *tx, staff_id)
                .await?
                .ok_or(AppError::InvalidReference("staffId"))?;
        }
        let service = match payload.service_id {
            Some(service_id) => Some(
                self.catalog_repo
                    .find_by_id(&mut *tx, service_id)
                    .await?
                    .ok_or(AppError::InvalidReference("serviceId"))?,
            ),
            None => None,
        };

        // 2. Horário
        let end_time = compute_end_time(
            payload.start_time,
            service.as_ref().map(|s| s.duration_minutes),
            payload.end_time,
        )?;

        if payload.status.occupies_schedule() {
            self.ensure_slot_free(&mut tx, id, payload.staff_id, payload.date, payload.start_time, end_time)
                .await?;
        }

        // 3. Produtos: as baixas antigas deste agendamento voltam ao saldo antes da conferência
        ensure_unique_products(&payload.products)?;
        if let Some(id) = id {
            self.inventory_repo.delete_appointment_movements(&mut *tx, id).await?;
        }
        let requested: Vec<(Uuid, Decimal)> =
            payload.products.iter().map(|p| (p.product_id, p.quantity)).collect();
        let lines = self.resolve_lines(&mut tx, &requested).await?;

        // 4. Agendamento
        let priced: Vec<(Decimal, Option<Decimal>)> = lines.iter().map(|l| (l.quantity, l.sale_price)).collect();
        let total = compute_total(service.as_ref().map(|s| s.price), &priced, payload.total_amount);

        let values = AppointmentValues {
            date: payload.date,
            start_time: payload.start_time,
            end_time,
            client_id: payload.client_id,
            staff_id: payload.staff_id,
            service_id: payload.service_id,
            status: payload.status,
            total_amount: Some(total),
            notes: payload.notes.clone(),
        };

        let appointment = match previous {
            Some(previous) => self
                .appointment_repo
                .update(&mut *tx, previous.id, &values)
                .await?
                .ok_or(AppError::ResourceNotFound("appointment"))?,
            None => self.appointment_repo.insert(&mut *tx, &values).await?,
        };

        // 5. Linhas + estoque
        self.appointment_repo.delete_lines(&mut *tx, appointment.id).await?;
        self.appointment_repo.insert_lines(&mut *tx, appointment.id, &requested).await?;

        if appointment.status.consumes_stock() {
            self.write_sale_movements(&mut tx, appointment.id, &lines).await?;
        }

        let detail = self.load_detail(&mut tx, appointment.id).await?;
        tx.commit().await?;

        tracing::info!(
            "📅 Agendamento {} gravado ({:?}, {} produto(s))",
            appointment.id,
            appointment.status,
            lines.len()
        );
        Ok(detail)
    }

    // =========================================================================
    //  3. STATUS E EXCLUSÃO
    // =========================================================================

    /// Mesmas regras de estoque da gravação: `completed` gera as baixas, qualquer outro status as remove.
    pub async fn change_status<'e, A>(
        &self,
        conn: A,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let current = self
            .appointment_repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::ResourceNotFound("appointment"))?;

        // Reativar um cancelado volta a ocupar a agenda
        if status.occupies_schedule() && !current.status.occupies_schedule() {
            self.ensure_slot_free(&mut tx, Some(id), current.staff_id, current.date, current.start_time, current.end_time)
                .await?;
        }

        self.inventory_repo.delete_appointment_movements(&mut *tx, id).await?;

        if status.consumes_stock() {
            let requested: Vec<(Uuid, Decimal)> = self
                .appointment_repo
                .product_lines(&mut *tx, id)
                .await?
                .into_iter()
                .map(|line| (line.product_id, line.quantity))
                .collect();
            let lines = self.resolve_lines(&mut tx, &requested).await?;
            self.write_sale_movements(&mut tx, id, &lines).await?;
        }

        self.appointment_repo
            .set_status(&mut *tx, id, status)
            .await?
            .ok_or(AppError::ResourceNotFound("appointment"))?;

        let detail = self.load_detail(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!("🔁 Agendamento {}: {:?} -> {:?}", id, current.status, status);
        Ok(detail)
    }

    /// Remove o agendamento, suas linhas e as baixas de estoque vinculadas.
    pub async fn delete<'e, A>(&self, conn: A, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        self.appointment_repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::ResourceNotFound("appointment"))?;

        let reverted = self.inventory_repo.delete_appointment_movements(&mut *tx, id).await?;
        self.appointment_repo.delete_lines(&mut *tx, id).await?;
        self.appointment_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        if reverted > 0 {
            tracing::info!("🗑️ Agendamento {} excluído; {} baixa(s) de estoque estornada(s)", id, reverted);
        }
        Ok(())
    }

    // =========================================================================
    //  Auxiliares
    // =========================================================================

    async fn load_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<AppointmentDetail, AppError> {
        let entry = self
            .appointment_repo
            .find_entry(&mut *conn, id)
            .await?
            .ok_or(AppError::ResourceNotFound("appointment"))?;
        let products = self.appointment_repo.product_lines(&mut *conn, id).await?;
        Ok(AppointmentDetail { entry, products })
    }

    async fn ensure_slot_free(
        &self,
        conn: &mut PgConnection,
        id: Option<Uuid>,
        staff_id: Option<Uuid>,
        date: chrono::NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), AppError> {
        if let Some(staff_id) = staff_id {
            // Sem a trava, duas gravações simultâneas leem o dia vazio e ambas inserem
            self.appointment_repo.lock_staff_day(&mut *conn, staff_id, date).await?;
            let same_day = self.appointment_repo.staff_day(&mut *conn, staff_id, date).await?;
            if let Some(other) = find_conflict(&same_day, id, start, end) {
                return Err(AppError::AppointmentConflict(other));
            }
        }

        let blocks = self.schedule_repo.blocks_on(&mut *conn, date).await?;
        if let Some(block) = find_block(&blocks, date, start, end) {
            return Err(AppError::ScheduleBlocked(block));
        }
        Ok(())
    }

    /// Trava cada produto e confere o saldo.
    async fn resolve_lines(
        &self,
        conn: &mut PgConnection,
        requested: &[(Uuid, Decimal)],
    ) -> Result<Vec<ResolvedLine>, AppError> {
        // Ordem fixa de travamento entre transações concorrentes
        let mut ordered = requested.to_vec();
        ordered.sort_by_key(|(product_id, _)| *product_id);

        let mut lines = Vec::with_capacity(ordered.len());
        for (product_id, quantity) in ordered {
            let product = self
                .inventory_repo
                .lock_product(&mut *conn, product_id)
                .await?
                .ok_or(AppError::InvalidReference("productId"))?;

            let balance = self.inventory_repo.balance(&mut *conn, product_id).await?;
            ensure_balance(&product.name, balance, StockMovementKind::Out, quantity)?;

            lines.push(ResolvedLine {
                product_id,
                name: product.name,
                quantity,
                sale_price: product.sale_price,
            });
        }
        Ok(lines)
    }

    async fn write_sale_movements(
        &self,
        conn: &mut PgConnection,
        appointment_id: Uuid,
        lines: &[ResolvedLine],
    ) -> Result<(), AppError> {
        for line in lines {
            self.inventory_repo
                .insert_movement(
                    &mut *conn,
                    line.product_id,
                    StockMovementKind::Out,
                    line.quantity,
                    SALE_REASON,
                    Some(SALE_NOTE),
                    Some(appointment_id),
                )
                .await?;
            tracing::debug!("Baixa de {} em '{}' pelo agendamento {}", line.quantity, line.name, appointment_id);
        }
        if !lines.is_empty() {
            tracing::info!(
                "✅ Agendamento {} finalizado: {} baixa(s) de estoque registradas",
                appointment_id,
                lines.len()
            );
        }
        Ok(())
    }
}

// ---
// Regras puras
// ---

/// Com serviço o fim é início + duração; sem serviço o fim informado é obrigatório.
pub(crate) fn compute_end_time(
    start: NaiveTime,
    service_duration_minutes: Option<i32>,
    informed_end: Option<NaiveTime>,
) -> Result<NaiveTime, AppError> {
    match service_duration_minutes {
        Some(minutes) => {
            let (end, wrapped_secs) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
            if wrapped_secs != 0 {
                return Err(AppError::CrossesMidnight);
            }
            Ok(end)
        }
        None => {
            let end = informed_end.ok_or(AppError::EndTimeRequired)?;
            if end <= start {
                return Err(AppError::field(
                    "endTime",
                    "time_order",
                    "A hora de fim deve ser depois da hora de início.",
                ));
            }
            Ok(end)
        }
    }
}

/// Valor manual prevalece; senão preço do serviço + Σ(quantidade × preço de venda).
pub(crate) fn compute_total(
    service_price: Option<Decimal>,
    lines: &[(Decimal, Option<Decimal>)],
    manual: Option<Decimal>,
) -> Decimal {
    if let Some(total) = manual {
        return total;
    }
    let products: Decimal = lines
        .iter()
        .map(|(quantity, price)| *quantity * price.unwrap_or(Decimal::ZERO))
        .sum();
    (service_price.unwrap_or(Decimal::ZERO) + products).round_dp(2)
}

/// Primeiro agendamento (ativo, de outro id) que cruza [start, end).
pub(crate) fn find_conflict(
    same_day: &[Appointment],
    editing: Option<Uuid>,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<Uuid> {
    same_day
        .iter()
        .filter(|a| Some(a.id) != editing && a.status.occupies_schedule())
        .find(|a| a.start_time < end && start < a.end_time)
        .map(|a| a.id)
}

pub(crate) fn find_block(
    blocks: &[ScheduleBlock],
    date: chrono::NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<Uuid> {
    blocks.iter().find(|b| b.overlaps(date, start, end)).map(|b| b.id)
}

pub(crate) fn ensure_unique_products(lines: &[ProductLinePayload]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.product_id) {
            return Err(AppError::DuplicateProduct(line.product_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::ScheduleBlockKind;
    use chrono::{NaiveDate, Utc};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 10).unwrap()
    }

    fn appointment(start: NaiveTime, end: NaiveTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            date: day(),
            start_time: start,
            end_time: end,
            client_id: None,
            staff_id: Some(Uuid::new_v4()),
            service_id: None,
            status,
            total_amount: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn end_time_follows_service_duration() {
        assert_eq!(compute_end_time(t(14, 30), Some(45), None).unwrap(), t(15, 15));
        // Fim informado é ignorado quando há serviço
        assert_eq!(compute_end_time(t(9, 0), Some(30), Some(t(11, 0))).unwrap(), t(9, 30));
    }

    #[test]
    fn service_running_past_midnight_is_rejected() {
        assert!(matches!(compute_end_time(t(23, 30), Some(45), None), Err(AppError::CrossesMidnight)));
        assert!(matches!(compute_end_time(t(23, 30), Some(30), None), Err(AppError::CrossesMidnight)));
        assert_eq!(compute_end_time(t(23, 0), Some(59), None).unwrap(), t(23, 59));
    }

    #[test]
    fn end_time_required_without_service() {
        assert!(matches!(compute_end_time(t(10, 0), None, None), Err(AppError::EndTimeRequired)));
        assert!(matches!(
            compute_end_time(t(10, 0), None, Some(t(10, 0))),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(compute_end_time(t(10, 0), None, Some(t(11, 0))).unwrap(), t(11, 0));
    }

    #[test]
    fn total_sums_service_and_products() {
        let lines = vec![
            (Decimal::new(2, 0), Some(Decimal::new(1250, 2))), // 2 × 12.50
            (Decimal::new(1, 0), None),
        ];
        assert_eq!(compute_total(Some(Decimal::new(80, 0)), &lines, None), Decimal::new(10500, 2));
        assert_eq!(compute_total(None, &[], None), Decimal::ZERO);
    }

    #[test]
    fn manual_total_overrides_calculation() {
        let lines = vec![(Decimal::new(3, 0), Some(Decimal::new(10, 0)))];
        assert_eq!(
            compute_total(Some(Decimal::new(50, 0)), &lines, Some(Decimal::new(60, 0))),
            Decimal::new(60, 0)
        );
    }

    #[test]
    fn overlapping_active_appointment_conflicts() {
        let busy = appointment(t(10, 0), t(11, 0), AppointmentStatus::Confirmed);
        let same_day = vec![busy.clone()];

        assert_eq!(find_conflict(&same_day, None, t(10, 30), t(11, 30)), Some(busy.id));
        assert_eq!(find_conflict(&same_day, None, t(9, 0), t(10, 1)), Some(busy.id));
        // Encostar não é conflito
        assert_eq!(find_conflict(&same_day, None, t(11, 0), t(12, 0)), None);
        assert_eq!(find_conflict(&same_day, None, t(9, 0), t(10, 0)), None);
        // Editando o próprio agendamento
        assert_eq!(find_conflict(&same_day, Some(busy.id), t(10, 0), t(11, 0)), None);
    }

    #[test]
    fn cancelled_appointments_do_not_conflict() {
        let cancelled = appointment(t(10, 0), t(11, 0), AppointmentStatus::Cancelled);
        assert_eq!(find_conflict(&[cancelled], None, t(10, 0), t(11, 0)), None);
    }

    #[test]
    fn blocks_reject_overlapping_slots() {
        let block = ScheduleBlock {
            id: Uuid::new_v4(),
            date: day(),
            start_time: Some(t(12, 0)),
            end_time: Some(t(13, 0)),
            kind: ScheduleBlockKind::Personal,
            reason: Some("Almoço".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let blocks = vec![block.clone()];
        assert_eq!(find_block(&blocks, day(), t(12, 30), t(13, 30)), Some(block.id));
        assert_eq!(find_block(&blocks, day(), t(13, 0), t(14, 0)), None);
    }

    #[test]
    fn repeated_product_is_rejected() {
        let product_id = Uuid::new_v4();
        let line = |q| ProductLinePayload { product_id, quantity: Decimal::new(q, 0) };
        assert!(ensure_unique_products(&[line(1)]).is_ok());
        assert!(matches!(
            ensure_unique_products(&[line(1), line(2)]),
            Err(AppError::DuplicateProduct(id)) if id == product_id
        ));
    }
}
