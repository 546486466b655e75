// src/common/time.rs

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Data de hoje no fuso local do servidor (o negócio opera em um único fuso).
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Último dia do mês (28..=31).
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Aceita "HH:MM" (campo de formulário) ou "HH:MM:SS".
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

// Horários trafegam como "HH:MM" no JSON.
pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_clock(&raw).ok_or_else(|| serde::de::Error::custom(format!("horário inválido: '{}'", raw)))
    }
}

pub mod hhmm_option {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    // String vazia conta como ausente, igual aos formulários.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_clock(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("horário inválido: '{}'", raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "hhmm")]
        start: NaiveTime,
        #[serde(default, with = "hhmm_option")]
        pause: Option<NaiveTime>,
    }

    #[test]
    fn clock_accepts_both_precisions() {
        assert_eq!(parse_clock("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_clock("18:05:00"), NaiveTime::from_hms_opt(18, 5, 0));
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("nove"), None);
    }

    #[test]
    fn slot_json_uses_short_clock() {
        let slot: Slot = serde_json::from_str(r#"{"start":"14:00:00","pause":""}"#).unwrap();
        assert_eq!(slot.start, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(slot.pause.is_none());

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "14:00");
        assert!(json["pause"].is_null());

        let missing: Slot = serde_json::from_str(r#"{"start":"08:15"}"#).unwrap();
        assert!(missing.pause.is_none());
        assert!(serde_json::from_str::<Slot>(r#"{"start":"8h"}"#).is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 13), None);
    }

    #[test]
    fn first_day() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(first_day_of_month(d), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
