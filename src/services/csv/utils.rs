use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{2}/\d{2}/\d{4}$",
        r"^\d{4}/\d{2}/\d{2}$",
        r"^\d{2}-\d{2}-\d{4}$",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// True when the trimmed value reads as a finite or infinite decimal number.
///
/// Textual spellings such as `NaN` or `inf` are not numbers here.
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return false;
    }
    trimmed.parse::<f64>().is_ok()
}

pub fn is_date_string(s: &str) -> bool {
    DATE_PATTERNS.iter().any(|re| re.is_match(s.trim()))
}

pub fn is_boolean(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "false" | "si" | "sí" | "no"
    )
}

/// Synthesized name for the 1-based column `position`.
pub fn synthesized_header(position: usize) -> String {
    format!("Columna {}", position)
}
