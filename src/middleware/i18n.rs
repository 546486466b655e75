// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "pt";

// Idioma preferido do cliente, extraído do Accept-Language.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_header(header_str: Option<&str>) -> Self {
        let lang = header_str
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    // "pt-BR" -> "pt"
                    .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase())
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }

    // Só temos mensagens em pt e en; qualquer outro idioma cai no português.
    pub fn is_portuguese(&self) -> bool {
        self.0 != "en"
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_subtag_of_first_language() {
        let locale = Locale::from_header(Some("en-US,en;q=0.9,pt-BR;q=0.8"));
        assert_eq!(locale.0, "en");
        assert!(!locale.is_portuguese());
    }

    #[test]
    fn missing_header_defaults_to_portuguese() {
        assert_eq!(Locale::from_header(None).0, "pt");
        assert!(Locale::default().is_portuguese());
    }

    #[test]
    fn unsupported_languages_fall_back_to_portuguese_messages() {
        let locale = Locale::from_header(Some("de-DE"));
        assert_eq!(locale.0, "de");
        assert!(locale.is_portuguese());
    }
}
