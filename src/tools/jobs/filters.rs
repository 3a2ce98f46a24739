//! Job search filter codes
//!
//! Free-form filter words from the model are normalised and mapped to the
//! job site's codes. Words without a code are dropped.

/// Lowercase, trim, and join words with `-` so "Entry level" matches "entry-level"
fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Employment type code (`f_JT`)
pub fn employment_code(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "full-time" | "fulltime" => Some("F"),
        "contract" => Some("C"),
        "part-time" | "parttime" => Some("P"),
        "temporary" => Some("T"),
        "internship" => Some("I"),
        "volunteer" => Some("V"),
        "other" => Some("O"),
        _ => None,
    }
}

/// Experience level code (`f_E`)
pub fn experience_code(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "internship" => Some("1"),
        "entry-level" => Some("2"),
        "associate" => Some("3"),
        "mid-senior-level" => Some("4"),
        "director" => Some("5"),
        "executive" => Some("6"),
        _ => None,
    }
}

/// Workplace type code (`f_WT`)
pub fn job_type_code(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "onsite" | "on-site" => Some("1"),
        "remote" => Some("2"),
        "hybrid" => Some("3"),
        _ => None,
    }
}

/// Map every value through `code`, dropping unknowns and duplicates
pub fn map_codes(values: &[String], code: fn(&str) -> Option<&'static str>) -> Vec<&'static str> {
    let mut codes = Vec::new();
    for value in values {
        match code(value) {
            Some(c) if !codes.contains(&c) => codes.push(c),
            Some(_) => {}
            None => tracing::debug!(value = %value, "dropping unknown job filter"),
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_employment_codes() {
        assert_eq!(employment_code("full-time"), Some("F"));
        assert_eq!(employment_code("Part time"), Some("P"));
        assert_eq!(employment_code("gig"), None);
    }

    #[test]
    fn test_experience_accepts_spaced_words() {
        assert_eq!(experience_code("entry level"), Some("2"));
        assert_eq!(experience_code("Mid-Senior level"), Some("4"));
        assert_eq!(experience_code("wizard"), None);
    }

    #[test]
    fn test_job_type_codes() {
        assert_eq!(job_type_code("remote"), Some("2"));
        assert_eq!(job_type_code("on-site"), Some("1"));
        assert_eq!(job_type_code("hybrid"), Some("3"));
    }

    #[test]
    fn test_unknown_values_are_dropped() {
        let codes = map_codes(&strings(&["full-time", "freelance", "contract"]), employment_code);
        assert_eq!(codes, vec!["F", "C"]);

        let none = map_codes(&strings(&["freelance"]), employment_code);
        assert!(none.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let codes = map_codes(&strings(&["remote", "Remote"]), job_type_code);
        assert_eq!(codes, vec!["2"]);
    }
}
