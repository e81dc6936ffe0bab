use chrono::{DateTime, Utc};

const MAX_STEM_CHARS: usize = 120;

/// `resume_<YYYY-MM-DD>_<unix-millis>.pdf` for the given instant.
pub fn default_filename(at: DateTime<Utc>) -> String {
    format!(
        "resume_{}_{}.pdf",
        at.format("%Y-%m-%d"),
        at.timestamp_millis()
    )
}

/// The caller's name made safe for a `Content-Disposition` header and a file
/// system, with a `.pdf` extension. Falls back to the timestamped default
/// when nothing usable is left.
pub fn resolve_filename(requested: Option<&str>, at: DateTime<Utc>) -> String {
    let Some(requested) = requested else {
        return default_filename(at);
    };
    // Only the last path component counts.
    let base = requested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let stem = strip_pdf_extension(base);

    let mut cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    cleaned = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();

    if cleaned.is_empty() {
        default_filename(at)
    } else {
        format!("{cleaned}.pdf")
    }
}

fn strip_pdf_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        &name[..name.len() - 4]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_filename_format() {
        assert_eq!(default_filename(instant()), "resume_2024-03-05_1709640000000.pdf");
    }

    #[test]
    fn test_requested_name_gets_pdf_extension() {
        assert_eq!(resolve_filename(Some("ada-cv"), instant()), "ada-cv.pdf");
        assert_eq!(resolve_filename(Some("ada-cv.PDF"), instant()), "ada-cv.pdf");
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        assert_eq!(
            resolve_filename(Some("../../etc/My CV \"final\".pdf"), instant()),
            "My_CV__final.pdf"
        );
    }

    #[test]
    fn test_blank_name_falls_back_to_default() {
        assert_eq!(resolve_filename(Some("  "), instant()), default_filename(instant()));
        assert_eq!(resolve_filename(None, instant()), default_filename(instant()));
        assert_eq!(resolve_filename(Some(".pdf"), instant()), default_filename(instant()));
    }
}
