// src/models/calendar.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{
    appointment::{AppointmentListEntry, AppointmentStatus},
    schedule::ScheduleBlock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthRef {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

// Célula do grid. `date = None` é o preenchimento antes do dia 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: Option<NaiveDate>,
    pub day: Option<u32>,
    pub is_today: bool,
    pub appointment_count: usize,
    /// Até três marcadores de status, na ordem dos horários
    pub markers: Vec<AppointmentStatus>,
    /// Quantos agendamentos ficaram além dos marcadores
    pub overflow: usize,
    pub blocked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub previous: MonthRef,
    pub next: MonthRef,
    /// Domingo primeiro; as células vazias iniciais completam a primeira semana
    pub cells: Vec<CalendarCell>,
    /// Chave "AAAA-MM-DD", cada grupo ordenado por horário
    #[schema(value_type = Object)]
    pub appointments_by_date: BTreeMap<NaiveDate, Vec<AppointmentListEntry>>,
    pub blocks: Vec<ScheduleBlock>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}
