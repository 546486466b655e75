// src/models/schedule.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{default_true, empty_as_none};
use crate::common::time::{hhmm, hhmm_option};

// =============================================================================
//  HORÁRIOS DE FUNCIONAMENTO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub id: Uuid,
    /// 0 = domingo ... 6 = sábado
    #[schema(example = 1)]
    pub weekday: i16,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub opens_at: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub closes_at: NaiveTime,
    #[serde(with = "hhmm_option")]
    #[schema(value_type = Option<String>, example = "12:00")]
    pub break_start: Option<NaiveTime>,
    #[serde(with = "hhmm_option")]
    #[schema(value_type = Option<String>, example = "13:00")]
    pub break_end: Option<NaiveTime>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_business_hours"))]
pub struct BusinessHoursPayload {
    #[validate(range(min = 0, max = 6, message = "O dia da semana deve estar entre 0 (domingo) e 6 (sábado)."))]
    pub weekday: i16,

    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub opens_at: NaiveTime,

    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub closes_at: NaiveTime,

    #[serde(default, with = "hhmm_option")]
    #[schema(value_type = Option<String>)]
    pub break_start: Option<NaiveTime>,

    #[serde(default, with = "hhmm_option")]
    #[schema(value_type = Option<String>)]
    pub break_end: Option<NaiveTime>,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn validate_business_hours(p: &BusinessHoursPayload) -> Result<(), ValidationError> {
    if p.opens_at >= p.closes_at {
        return Err(invalid("opening_hours", "A abertura deve ser antes do fechamento."));
    }
    match (p.break_start, p.break_end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if start >= end {
                return Err(invalid("break_order", "O início do intervalo deve ser antes do fim."));
            }
            if start < p.opens_at || end > p.closes_at {
                return Err(invalid("break_outside", "O intervalo deve estar dentro do horário de funcionamento."));
            }
            Ok(())
        }
        _ => Err(invalid("break_incomplete", "Informe início e fim do intervalo.")),
    }
}

// =============================================================================
//  BLOQUEIOS DE AGENDA
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "schedule_block_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleBlockKind {
    Holiday,     // Feriado
    Maintenance, // Manutenção
    Personal,    // Pessoal
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Sem horários = dia inteiro bloqueado
    #[serde(with = "hhmm_option")]
    #[schema(value_type = Option<String>, example = "08:00")]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "hhmm_option")]
    #[schema(value_type = Option<String>, example = "12:00")]
    pub end_time: Option<NaiveTime>,
    pub kind: ScheduleBlockKind,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleBlock {
    pub fn is_full_day(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }

    /// O intervalo [start, end) cruza o bloqueio?
    pub fn overlaps(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        if self.date != date {
            return false;
        }
        if self.is_full_day() {
            return true;
        }
        self.start_time
            .zip(self.end_time)
            .is_some_and(|(block_start, block_end)| start < block_end && block_start < end)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_block"))]
pub struct ScheduleBlockPayload {
    pub date: NaiveDate,

    #[serde(default, with = "hhmm_option")]
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,

    #[serde(default, with = "hhmm_option")]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,

    #[serde(default)]
    pub kind: ScheduleBlockKind,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub reason: Option<String>,
}

fn validate_block(p: &ScheduleBlockPayload) -> Result<(), ValidationError> {
    match (p.start_time, p.end_time) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(invalid("block_order", "O início do bloqueio deve ser antes do fim.")),
        _ => Err(invalid("block_incomplete", "Informe início e fim ou deixe ambos vazios para o dia inteiro.")),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BlockFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Apenas bloqueios de hoje em diante
    #[serde(default)]
    pub upcoming: bool,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours(open: NaiveTime, close: NaiveTime, brk: Option<(NaiveTime, NaiveTime)>) -> BusinessHoursPayload {
        BusinessHoursPayload {
            weekday: 2,
            opens_at: open,
            closes_at: close,
            break_start: brk.map(|b| b.0),
            break_end: brk.map(|b| b.1),
            active: true,
        }
    }

    #[test]
    fn business_hours_rules() {
        assert!(hours(t(9, 0), t(18, 0), None).validate().is_ok());
        assert!(hours(t(9, 0), t(18, 0), Some((t(12, 0), t(13, 0)))).validate().is_ok());
        assert!(hours(t(18, 0), t(9, 0), None).validate().is_err());
        assert!(hours(t(9, 0), t(18, 0), Some((t(13, 0), t(12, 0)))).validate().is_err());
        assert!(hours(t(9, 0), t(18, 0), Some((t(8, 0), t(10, 0)))).validate().is_err());

        let mut half_break = hours(t(9, 0), t(18, 0), None);
        half_break.break_start = Some(t(12, 0));
        assert!(half_break.validate().is_err());

        let mut bad_day = hours(t(9, 0), t(18, 0), None);
        bad_day.weekday = 7;
        assert!(bad_day.validate().is_err());
    }

    #[test]
    fn block_payload_needs_both_times_or_none() {
        let p: ScheduleBlockPayload =
            serde_json::from_str(r#"{"date":"2025-12-25","kind":"holiday"}"#).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.kind, ScheduleBlockKind::Holiday);

        let p: ScheduleBlockPayload =
            serde_json::from_str(r#"{"date":"2025-12-24","startTime":"14:00"}"#).unwrap();
        assert!(p.validate().is_err());
        assert_eq!(p.kind, ScheduleBlockKind::Other);
    }

    #[test]
    fn block_overlap() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut block = ScheduleBlock {
            id: Uuid::new_v4(),
            date: day,
            start_time: Some(t(12, 0)),
            end_time: Some(t(14, 0)),
            kind: ScheduleBlockKind::Personal,
            reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(block.overlaps(day, t(13, 0), t(13, 30)));
        assert!(block.overlaps(day, t(11, 0), t(12, 30)));
        assert!(!block.overlaps(day, t(14, 0), t(15, 0)));
        assert!(!block.overlaps(day, t(10, 0), t(12, 0)));
        assert!(!block.overlaps(day.succ_opt().unwrap(), t(13, 0), t(13, 30)));

        block.start_time = None;
        block.end_time = None;
        assert!(block.is_full_day());
        assert!(block.overlaps(day, t(7, 0), t(7, 30)));
        assert!(block.overlaps(day, t(22, 0), t(23, 59)));

        // Só um dos horários preenchido conta como dia inteiro
        block.start_time = Some(t(12, 0));
        assert!(block.is_full_day());
        assert!(block.overlaps(day, t(7, 0), t(7, 30)));
    }
}
