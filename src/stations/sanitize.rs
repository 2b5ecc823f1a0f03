use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static FREQUENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]{2,3}(?:\.[0-9])?)\s*(FM|AM)(?-u:\b)").expect("frequency pattern"));
static LOCATION_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[|/]+").expect("location separator pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Dial position taken from a station name, e.g. `"90.7 FM"`.
pub fn derive_frequency(name: &str) -> String {
    FREQUENCY
        .captures(name.trim())
        .map(|captures| {
            format!(
                "{} {}",
                &captures[1],
                captures[2].to_ascii_uppercase()
            )
        })
        .unwrap_or_default()
}

pub fn clean_location(value: &str) -> String {
    let separated = LOCATION_SEPARATORS.replace_all(value.trim(), " ");
    let cleaned = WHITESPACE.replace_all(&separated, " ").trim().to_string();
    if cleaned.chars().count() < 2 {
        return String::new();
    }
    cleaned
}

/// Case-insensitive ordering with lower case ahead of upper case on ties,
/// the way a locale collator orders station names.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_frequency_from_names() {
        assert_eq!(derive_frequency("Love Radio 90.7 FM"), "90.7 FM");
        assert_eq!(derive_frequency("DZRH 666am News"), "666 AM");
        assert_eq!(derive_frequency("Radyo Pilipinas 738 AM Manila"), "738 AM");
        assert_eq!(derive_frequency("Energy FM"), "");
        assert_eq!(derive_frequency("Wave 89.1FMX"), "");
    }

    #[test]
    fn frequency_digits_and_boundaries_are_ascii() {
        assert_eq!(derive_frequency("Radio \u{669}\u{660} FM"), "");
        assert_eq!(derive_frequency("Radyo 95.5 FMé"), "95.5 FM");
    }

    #[test]
    fn cleans_locations() {
        assert_eq!(clean_location("  Cebu | Mandaue // City "), "Cebu Mandaue City");
        assert_eq!(clean_location(" / x | "), "");
        assert_eq!(clean_location(""), "");
    }

    #[test]
    fn name_ordering_ignores_case_first() {
        assert_eq!(compare_names("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_names("Beta", "alpha"), Ordering::Greater);
        assert_eq!(compare_names("radio", "Radio"), Ordering::Less);
        assert_eq!(compare_names("Radio", "Radio"), Ordering::Equal);
    }
}
