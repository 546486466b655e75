// src/services/calendar_service.rs

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use sqlx::PgConnection;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentRepository, ScheduleRepository},
    models::{
        appointment::{AppointmentFilter, AppointmentListEntry},
        calendar::{CalendarCell, CalendarMonth, CalendarQuery, MonthRef},
        schedule::ScheduleBlock,
    },
};

/// Quantos marcadores de status cabem numa célula.
const MAX_MARKERS: usize = 3;

#[derive(Clone)]
pub struct CalendarService {
    appointment_repo: AppointmentRepository,
    schedule_repo: ScheduleRepository,
}

impl CalendarService {
    pub fn new(appointment_repo: AppointmentRepository, schedule_repo: ScheduleRepository) -> Self {
        Self { appointment_repo, schedule_repo }
    }

    pub async fn month(&self, conn: &mut PgConnection, query: &CalendarQuery) -> Result<CalendarMonth, AppError> {
        let today = time::today();
        let (year, month) = resolve_month(query, today)?;
        let (first, last) = month_bounds(year, month)?;

        let filter = AppointmentFilter {
            from: Some(first),
            to: Some(last),
            ..Default::default()
        };
        let appointments = self.appointment_repo.list(&mut *conn, &filter).await?;
        let blocks = self.schedule_repo.list_blocks(&mut *conn, Some(first), Some(last)).await?;

        Ok(build_month(year, month, today, appointments, blocks))
    }
}

fn resolve_month(query: &CalendarQuery, today: NaiveDate) -> Result<(i32, u32), AppError> {
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::field("month", "range", "O mês deve estar entre 1 e 12."));
    }
    Ok((year, month))
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::field("year", "range", "Ano fora do intervalo suportado.");
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let days = time::days_in_month(year, month).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, month, days).ok_or_else(invalid)?;
    Ok((first, last))
}

pub(crate) fn previous_month(year: i32, month: u32) -> MonthRef {
    if month == 1 {
        MonthRef { year: year - 1, month: 12 }
    } else {
        MonthRef { year, month: month - 1 }
    }
}

pub(crate) fn next_month(year: i32, month: u32) -> MonthRef {
    if month == 12 {
        MonthRef { year: year + 1, month: 1 }
    } else {
        MonthRef { year, month: month + 1 }
    }
}

/// Monta o grid do mês. `appointments` e `blocks` já vêm filtrados pelo mês.
pub(crate) fn build_month(
    year: i32,
    month: u32,
    today: NaiveDate,
    appointments: Vec<AppointmentListEntry>,
    blocks: Vec<ScheduleBlock>,
) -> CalendarMonth {
    let mut by_date: BTreeMap<NaiveDate, Vec<AppointmentListEntry>> = BTreeMap::new();
    for entry in appointments {
        by_date.entry(entry.appointment.date).or_default().push(entry);
    }
    for group in by_date.values_mut() {
        group.sort_by_key(|e| e.appointment.start_time);
    }

    let mut cells = Vec::new();
    if let (Some(first), Some(days)) = (NaiveDate::from_ymd_opt(year, month, 1), time::days_in_month(year, month)) {
        // Domingo = 0 células vazias, sábado = 6
        let leading = first.weekday().num_days_from_sunday() as usize;
        cells.extend((0..leading).map(|_| empty_cell()));

        for day in 1..=days {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else { continue };
            let group = by_date.get(&date).map(Vec::as_slice).unwrap_or_default();
            let markers: Vec<_> = group.iter().take(MAX_MARKERS).map(|e| e.appointment.status).collect();

            cells.push(CalendarCell {
                date: Some(date),
                day: Some(day),
                is_today: date == today,
                appointment_count: group.len(),
                overflow: group.len().saturating_sub(MAX_MARKERS),
                markers,
                blocked: blocks.iter().any(|b| b.date == date),
            });
        }
    }

    CalendarMonth {
        year,
        month,
        previous: previous_month(year, month),
        next: next_month(year, month),
        cells,
        appointments_by_date: by_date,
        blocks,
    }
}

fn empty_cell() -> CalendarCell {
    CalendarCell {
        date: None,
        day: None,
        is_today: false,
        appointment_count: 0,
        markers: Vec::new(),
        overflow: 0,
        blocked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        appointment::{Appointment, AppointmentStatus},
        schedule::ScheduleBlockKind,
    };
    use chrono::{NaiveTime, Timelike, Utc};
    use uuid::Uuid;

    fn entry(date: NaiveDate, hour: u32, status: AppointmentStatus) -> AppointmentListEntry {
        let start = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        AppointmentListEntry {
            appointment: Appointment {
                id: Uuid::new_v4(),
                date,
                start_time: start,
                end_time: start + chrono::Duration::minutes(30),
                client_id: None,
                staff_id: None,
                service_id: None,
                status,
                total_amount: None,
                notes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            client_name: None,
            client_phone: None,
            staff_name: None,
            service_name: None,
            service_duration_minutes: None,
            service_price: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn grid_starts_on_sunday() {
        // 1º de junho de 2025 é domingo; 1º de outubro de 2025 é quarta
        let june = build_month(2025, 6, d(2025, 6, 10), vec![], vec![]);
        assert_eq!(june.cells.len(), 30);
        assert_eq!(june.cells[0].day, Some(1));

        let october = build_month(2025, 10, d(2025, 6, 10), vec![], vec![]);
        assert_eq!(october.cells.iter().take_while(|c| c.date.is_none()).count(), 3);
        assert_eq!(october.cells.len(), 3 + 31);
        assert_eq!(october.cells[3].date, Some(d(2025, 10, 1)));
    }

    #[test]
    fn today_is_flagged() {
        let month = build_month(2025, 6, d(2025, 6, 10), vec![], vec![]);
        let flagged: Vec<_> = month.cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].day, Some(10));
    }

    #[test]
    fn markers_are_capped_and_grouped_by_time() {
        let day = d(2025, 6, 12);
        let appointments = vec![
            entry(day, 15, AppointmentStatus::Cancelled),
            entry(day, 9, AppointmentStatus::Confirmed),
            entry(day, 11, AppointmentStatus::Pending),
            entry(day, 10, AppointmentStatus::Completed),
            entry(day, 16, AppointmentStatus::Pending),
            entry(d(2025, 6, 13), 8, AppointmentStatus::Pending),
        ];
        let month = build_month(2025, 6, d(2025, 6, 1), appointments, vec![]);

        let cell = month.cells.iter().find(|c| c.date == Some(day)).unwrap();
        assert_eq!(cell.appointment_count, 5);
        assert_eq!(
            cell.markers,
            vec![AppointmentStatus::Confirmed, AppointmentStatus::Completed, AppointmentStatus::Pending]
        );
        assert_eq!(cell.overflow, 2);

        let group = &month.appointments_by_date[&day];
        let hours: Vec<u32> = group.iter().map(|e| e.appointment.start_time.hour()).collect();
        assert_eq!(hours, vec![9, 10, 11, 15, 16]);
        assert_eq!(month.appointments_by_date.len(), 2);
    }

    #[test]
    fn navigation_wraps_the_year() {
        let december = build_month(2025, 12, d(2025, 12, 1), vec![], vec![]);
        assert_eq!(december.next, MonthRef { year: 2026, month: 1 });
        assert_eq!(december.previous, MonthRef { year: 2025, month: 11 });

        assert_eq!(previous_month(2026, 1), MonthRef { year: 2025, month: 12 });
    }

    #[test]
    fn blocked_days_are_marked() {
        let block = ScheduleBlock {
            id: Uuid::new_v4(),
            date: d(2025, 12, 25),
            start_time: None,
            end_time: None,
            kind: ScheduleBlockKind::Holiday,
            reason: Some("Natal".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let month = build_month(2025, 12, d(2025, 12, 1), vec![], vec![block]);
        let blocked: Vec<_> = month.cells.iter().filter(|c| c.blocked).filter_map(|c| c.day).collect();
        assert_eq!(blocked, vec![25]);
        assert_eq!(month.blocks.len(), 1);
    }

    #[test]
    fn month_query_defaults_and_bounds() {
        let today = d(2025, 3, 9);
        assert_eq!(resolve_month(&CalendarQuery::default(), today).unwrap(), (2025, 3));
        let explicit = CalendarQuery { year: Some(2024), month: Some(2) };
        assert_eq!(resolve_month(&explicit, today).unwrap(), (2024, 2));
        let invalid = CalendarQuery { year: None, month: Some(13) };
        assert!(matches!(resolve_month(&invalid, today), Err(AppError::ValidationError(_))));

        assert_eq!(month_bounds(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
    }
}
