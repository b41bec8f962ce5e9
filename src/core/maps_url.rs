use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn place_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // 標準地點網址
            r"place/[^/]+/([^/]+)",
            r"place_id=([^&]+)",
            // 帶 cid 參數的舊式網址
            r"maps\?.*?cid=(\d+)",
            r"maps/search/[^/@]+/@[^/]+/([^/]+)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Extracts a place identifier from a Google Maps URL, or `None` when no known format matches.
pub fn extract_place_id(maps_url: &str) -> Option<String> {
    let maps_url = maps_url.trim();
    if maps_url.is_empty() {
        return None;
    }

    for pattern in place_id_patterns() {
        if let Some(id) = pattern.captures(maps_url).and_then(|caps| caps.get(1)) {
            return Some(id.as_str().to_string());
        }
    }

    let url = Url::parse(maps_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "place_id")
        .or_else(|| url.query_pairs().find(|(key, _)| key == "pbid"))
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_place_url() {
        let url = "https://www.google.com/maps/place/Corner+Cafe/ChIJN1t_tDeuEmsRUsoyG83frY4";
        assert_eq!(
            extract_place_id(url).as_deref(),
            Some("ChIJN1t_tDeuEmsRUsoyG83frY4")
        );
    }

    #[test]
    fn test_extract_from_place_id_parameter() {
        let url = "https://www.google.com/maps/search/?api=1&query=cafe&place_id=ChIJabc&hl=en";
        assert_eq!(extract_place_id(url).as_deref(), Some("ChIJabc"));
    }

    #[test]
    fn test_extract_from_cid_url() {
        let url = "https://maps.google.com/maps?hl=en&cid=1234567890123";
        assert_eq!(extract_place_id(url).as_deref(), Some("1234567890123"));
    }

    #[test]
    fn test_extract_from_search_url() {
        let url = "https://www.google.com/maps/search/cafe/@47.6,-122.3,15z/data=abc";
        assert_eq!(extract_place_id(url).as_deref(), Some("data=abc"));
    }

    #[test]
    fn test_extract_from_pbid_parameter() {
        let url = "https://www.google.com/maps?pbid=XYZ789";
        assert_eq!(extract_place_id(url).as_deref(), Some("XYZ789"));
    }

    #[test]
    fn test_unrecognized_url() {
        assert_eq!(extract_place_id("https://example.com/somewhere"), None);
        assert_eq!(extract_place_id(""), None);
        assert_eq!(extract_place_id("not a url"), None);
    }
}
