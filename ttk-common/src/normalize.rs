//! Field normalization for raw source text
//!
//! The source platform delivers every detail field as free text. These
//! functions convert that text into typed values with an explicit
//! fallback-to-None policy: malformed input is a logged data-quality event,
//! never an error. All functions are total and idempotent.

use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder the source emits where a value exists only on a sub-page
pub const DETAIL_PLACEHOLDER: &str = "Ver detalle de la adjudicación";

/// Date-time formats attempted, in order, by [`parse_date`]
const DATE_FORMATS: [&str; 3] = [
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a source date string into a `NaiveDateTime`
///
/// Tries each supported format in order; a bare date (`%Y-%m-%d`) resolves
/// to midnight. Empty input is None. Input matching no format is None and
/// logged as a parse failure.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    tracing::warn!(value = text, "Unparseable date, substituting null");
    None
}

/// Parse a source integer string, None on malformed input
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parse a source decimal string, None on malformed input
pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Normalize a display name: Unicode uppercase
///
/// Punctuation and diacritic handling belong to the similar-name comparison
/// key, not here; identity matching stays exact on this form.
pub fn normalize_name(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Coerce the source's "no value" markers to None
///
/// Empty and whitespace-only strings, and the sub-page placeholder text,
/// all mean "no value" on the source platform.
pub fn coerce_sentinel(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == DETAIL_PLACEHOLDER {
        None
    } else {
        Some(trimmed)
    }
}

/// [`coerce_sentinel`] lifted over optional fields
pub fn coerce_opt(text: Option<&str>) -> Option<String> {
    text.and_then(coerce_sentinel).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_source_format() {
        let dt = parse_date("31/12/2023 10:00:00").unwrap();
        assert_eq!(dt.to_string(), "2023-12-31 10:00:00");
    }

    #[test]
    fn parse_date_iso_formats() {
        assert!(parse_date("2023-12-31 10:00:00").is_some());
        assert!(parse_date("2023-12-31 10:00:00.123456").is_some());
        let midnight = parse_date("2023-12-31").unwrap();
        assert_eq!(midnight.to_string(), "2023-12-31 00:00:00");
    }

    #[test]
    fn parse_date_empty_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn parse_date_garbage_is_none() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("32/13/2023 99:00:00"), None);
    }

    #[test]
    fn parse_date_idempotent_on_normalized_output() {
        let first = parse_date("31/12/2023 10:00:00").unwrap();
        let second = parse_date(&first.to_string()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_int_handles_malformed() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("42.0"), None);
        assert_eq!(parse_int("dos"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn parse_float_handles_malformed() {
        assert_eq!(parse_float("1234.56"), Some(1234.56));
        assert_eq!(parse_float("1234"), Some(1234.0));
        assert_eq!(parse_float("1.234,56"), None);
        assert_eq!(parse_float(""), None);
    }

    #[test]
    fn normalize_name_uppercases() {
        assert_eq!(normalize_name("Construcciones Pérez s.l."), "CONSTRUCCIONES PÉREZ S.L.");
    }

    #[test]
    fn normalize_name_idempotent() {
        let once = normalize_name("Construcciones Pérez s.l.");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn sentinel_values_coerce_to_none() {
        assert_eq!(coerce_sentinel(""), None);
        assert_eq!(coerce_sentinel("   "), None);
        assert_eq!(coerce_sentinel(DETAIL_PLACEHOLDER), None);
        assert_eq!(coerce_sentinel("Abierto"), Some("Abierto"));
    }

    #[test]
    fn coerce_opt_lifts_over_options() {
        assert_eq!(coerce_opt(None), None);
        assert_eq!(coerce_opt(Some("")), None);
        assert_eq!(coerce_opt(Some("Obras")), Some("Obras".to_string()));
    }
}
