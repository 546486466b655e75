// src/services/dashboard_service.rs

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};

use crate::{
    common::{error::AppError, time},
    db::DashboardRepository,
    models::{
        appointment::AppointmentStatus,
        dashboard::{Dashboard, MonthAppointmentRow, ServiceRankingEntry},
    },
};

const UPCOMING_LIMIT: i64 = 5;
const RECENT_CLIENTS_LIMIT: i64 = 5;
const RANKING_SIZE: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn summary<'e, A>(&self, conn: A) -> Result<Dashboard, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let today = time::today();
        let first = time::first_day_of_month(today);
        let last = time::days_in_month(today.year(), today.month())
            .and_then(|days| today.with_day(days))
            .unwrap_or(today);

        // REPEATABLE READ: todos os números saem do mesmo snapshot
        let mut tx = conn.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let counters = self.repo.daily_counters(&mut *tx, today).await?;
        let month_rows = self.repo.month_appointments(&mut *tx, first, last).await?;
        let upcoming = self.repo.upcoming(&mut *tx, today, UPCOMING_LIMIT).await?;
        let recent_clients = self.repo.recent_clients(&mut *tx, RECENT_CLIENTS_LIMIT).await?;

        tx.commit().await?;

        let revenue_today = completed_revenue(&month_rows, Some(today));
        let revenue_month = completed_revenue(&month_rows, None);
        let services_this_month = counted_services(&month_rows);
        let popular_services = rank_services(&month_rows, RANKING_SIZE);

        Ok(Dashboard {
            date: today,
            counters,
            revenue_today,
            revenue_month,
            average_ticket_month: average_ticket(revenue_month, services_this_month),
            services_this_month,
            upcoming,
            popular_services,
            recent_clients,
        })
    }
}

/// Σ preço do serviço dos finalizados (no dia, ou no período inteiro com `None`).
pub(crate) fn completed_revenue(rows: &[MonthAppointmentRow], day: Option<NaiveDate>) -> Decimal {
    rows.iter()
        .filter(|r| r.status == AppointmentStatus::Completed)
        .filter(|r| day.is_none_or(|d| r.date == d))
        .filter_map(|r| r.service_price)
        .sum()
}

// Atendimentos com serviço que não foram cancelados.
fn counted_rows(rows: &[MonthAppointmentRow]) -> impl Iterator<Item = (&str, Decimal)> {
    rows.iter()
        .filter(|r| r.status != AppointmentStatus::Cancelled)
        .filter_map(|r| {
            r.service_name
                .as_deref()
                .map(|name| (name, r.service_price.unwrap_or(Decimal::ZERO)))
        })
}

pub(crate) fn counted_services(rows: &[MonthAppointmentRow]) -> u32 {
    counted_rows(rows).count() as u32
}

/// Agrupa por nome do serviço; mais realizados primeiro, empate pelo nome.
pub(crate) fn rank_services(rows: &[MonthAppointmentRow], size: usize) -> Vec<ServiceRankingEntry> {
    let mut groups: HashMap<&str, (u32, Decimal)> = HashMap::new();
    for (name, price) in counted_rows(rows) {
        let group = groups.entry(name).or_insert((0, Decimal::ZERO));
        group.0 += 1;
        group.1 += price;
    }

    let mut ranking: Vec<ServiceRankingEntry> = groups
        .into_iter()
        .map(|(name, (count, total_value))| ServiceRankingEntry {
            name: name.to_string(),
            count,
            total_value,
        })
        .collect();
    ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranking.truncate(size);
    ranking
}

pub(crate) fn average_ticket(revenue: Decimal, services: u32) -> Decimal {
    if services == 0 {
        return Decimal::ZERO;
    }
    (revenue / Decimal::from(services)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    fn row(day: u32, status: AppointmentStatus, service: Option<(&str, i64)>) -> MonthAppointmentRow {
        MonthAppointmentRow {
            date: d(day),
            status,
            service_name: service.map(|(n, _)| n.to_string()),
            service_price: service.map(|(_, p)| Decimal::new(p, 0)),
        }
    }

    fn sample() -> Vec<MonthAppointmentRow> {
        use AppointmentStatus::*;
        vec![
            row(5, Completed, Some(("Corte", 50))),
            row(5, Completed, Some(("Escova", 40))),
            row(5, Pending, Some(("Corte", 50))),
            row(3, Completed, Some(("Corte", 50))),
            row(3, Cancelled, Some(("Manicure", 30))),
            row(4, Confirmed, Some(("Escova", 40))),
            row(4, Completed, None),
        ]
    }

    #[test]
    fn revenue_counts_only_completed() {
        let rows = sample();
        assert_eq!(completed_revenue(&rows, Some(d(5))), Decimal::new(90, 0));
        assert_eq!(completed_revenue(&rows, None), Decimal::new(140, 0));
        assert_eq!(completed_revenue(&rows, Some(d(1))), Decimal::ZERO);
    }

    #[test]
    fn ranking_skips_cancelled_and_orders_by_count() {
        let ranking = rank_services(&sample(), 5);
        assert_eq!(
            ranking,
            vec![
                ServiceRankingEntry { name: "Corte".into(), count: 3, total_value: Decimal::new(150, 0) },
                ServiceRankingEntry { name: "Escova".into(), count: 2, total_value: Decimal::new(80, 0) },
            ]
        );
        assert_eq!(rank_services(&sample(), 1).len(), 1);
    }

    #[test]
    fn average_ticket_divides_month_revenue_by_services() {
        let rows = sample();
        let services = counted_services(&rows);
        assert_eq!(services, 5);
        assert_eq!(average_ticket(completed_revenue(&rows, None), services), Decimal::new(28, 0));
        assert_eq!(average_ticket(Decimal::new(100, 0), 0), Decimal::ZERO);
        assert_eq!(average_ticket(Decimal::new(100, 0), 3), Decimal::new(3333, 2));
    }
}
