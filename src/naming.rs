use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

use crate::model::Record;

const ID_PREFIX_LEN: usize = 8;
const ID_PLACEHOLDER: &str = "XXXXXXXX";

/// `{date}_Personaldaten_{ID}_{first}_{last}.pdf`
pub fn file_name(record: &Record, today: NaiveDate) -> String {
    let id = record
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.chars()
                .take(ID_PREFIX_LEN)
                .collect::<String>()
                .to_uppercase()
        })
        .unwrap_or_else(|| ID_PLACEHOLDER.to_string());

    format!(
        "{}_Personaldaten_{}_{}_{}.pdf",
        today.format("%Y-%m-%d"),
        sanitize(&id),
        sanitize(&record.first_name),
        sanitize(&record.last_name),
    )
}

/// Strip diacritics, turn whitespace runs into `_` and drop anything outside
/// `[A-Za-z0-9_-]`.
pub fn sanitize(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|&c| !is_combining_mark(c)).collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str, last: &str, id: Option<&str>) -> Record {
        Record {
            first_name: first.to_string(),
            last_name: last.to_string(),
            user_id: id.map(str::to_string),
            ..Default::default()
        }
    }

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn accented_names() {
        let r = record("José", "Müller", Some("abcdef1234567890"));
        assert_eq!(
            file_name(&r, march_first()),
            "2024-03-01_Personaldaten_ABCDEF12_Jose_Muller.pdf"
        );
    }

    #[test]
    fn deterministic() {
        let r = record("Anna Lena", "Groß-Schmidt", Some("0f9e8d7c"));
        assert_eq!(file_name(&r, march_first()), file_name(&r, march_first()));
    }

    #[test]
    fn missing_id_uses_placeholder() {
        let r = record("Jo", "Doe", None);
        assert_eq!(
            file_name(&r, march_first()),
            "2024-03-01_Personaldaten_XXXXXXXX_Jo_Doe.pdf"
        );
        let blank = record("Jo", "Doe", Some("   "));
        assert!(file_name(&blank, march_first()).contains("_XXXXXXXX_"));
    }

    #[test]
    fn sanitize_rules() {
        assert_eq!(sanitize("Müller"), "Muller");
        assert_eq!(sanitize("  Anna   Lena \t Marie "), "Anna_Lena_Marie");
        assert_eq!(sanitize("O'Brien/../etc"), "OBrienetc");
        assert_eq!(sanitize("Groß-Schmidt"), "Gro-Schmidt");
        assert_eq!(sanitize("Ærøskøbing"), "rskbing");
    }
}
