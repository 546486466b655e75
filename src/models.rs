pub mod appointment;
pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod inventory;
pub mod schedule;
pub mod staff;

use serde::{Deserialize, Deserializer};

pub(crate) fn default_true() -> bool {
    true
}

// Os formulários mandam "" para campos opcionais não preenchidos.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "empty_as_none")]
        email: Option<String>,
    }

    #[test]
    fn blank_strings_become_none() {
        let f: Form = serde_json::from_str(r#"{"email":"   "}"#).unwrap();
        assert!(f.email.is_none());
        let f: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert!(f.email.is_none());
        let f: Form = serde_json::from_str(r#"{"email":" a@b.com "}"#).unwrap();
        assert_eq!(f.email.as_deref(), Some("a@b.com"));
    }
}
