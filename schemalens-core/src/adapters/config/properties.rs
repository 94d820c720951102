//! Extra driver properties parsed from a `key=value&key=value` string.

use indexmap::IndexMap;

/// Ordered driver properties.
///
/// Keys and values are form-urlencoded decoded. A repeated key keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionProperties {
    entries: IndexMap<String, String>,
}

impl ConnectionProperties {
    /// Parses a query-string-like properties string.
    ///
    /// Empty input and empty segments (`a=1&&b=2`) are accepted.
    ///
    /// # Errors
    /// Returns a configuration error if a segment has no `=` or an empty key.
    ///
    /// # Example
    /// ```rust
    /// use schemalens_core::adapters::ConnectionProperties;
    ///
    /// let props = ConnectionProperties::parse("charset=utf8mb4&ssl-mode=DISABLED").unwrap();
    /// assert_eq!(props.get("charset"), Some("utf8mb4"));
    /// assert_eq!(props.len(), 2);
    /// ```
    pub fn parse(input: &str) -> crate::Result<Self> {
        let mut entries = IndexMap::new();

        for segment in input.trim().split('&') {
            if segment.is_empty() {
                continue;
            }

            if !segment.contains('=') {
                return Err(crate::error::ExtractorError::configuration(format!(
                    "Malformed connection property '{}': expected key=value",
                    segment
                )));
            }

            let Some((key, value)) = url::form_urlencoded::parse(segment.as_bytes()).next() else {
                continue;
            };

            if key.trim().is_empty() {
                return Err(crate::error::ExtractorError::configuration(format!(
                    "Malformed connection property '{}': empty key",
                    segment
                )));
            }

            entries.insert(key.into_owned(), value.into_owned());
        }

        Ok(Self { entries })
    }

    /// Gets a property value by exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Gets the first value whose key matches any of `keys`, ignoring ASCII case.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| keys.iter().any(|candidate| k.eq_ignore_ascii_case(candidate)))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over key/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no properties are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_basic_pairs() {
        let props = ConnectionProperties::parse("charset=utf8mb4&connect_timeout=10").unwrap();
        let pairs: Vec<(&str, &str)> = props.iter().collect();
        assert_eq!(
            pairs,
            vec![("charset", "utf8mb4"), ("connect_timeout", "10")]
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(ConnectionProperties::parse("").unwrap().is_empty());
        assert!(ConnectionProperties::parse("   ").unwrap().is_empty());
        assert!(ConnectionProperties::parse("&&").unwrap().is_empty());
    }

    #[test]
    fn test_parse_decodes_values() {
        let props =
            ConnectionProperties::parse("application_name=schema+lens&options=%2Dc%20x").unwrap();
        assert_eq!(props.get("application_name"), Some("schema lens"));
        assert_eq!(props.get("options"), Some("-c x"));
    }

    #[test]
    fn test_parse_allows_empty_value() {
        let props = ConnectionProperties::parse("sslmode=").unwrap();
        assert_eq!(props.get("sslmode"), Some(""));
    }

    #[test]
    fn test_duplicate_key_takes_last_value_first_position() {
        let props = ConnectionProperties::parse("a=1&b=2&a=3").unwrap();
        let pairs: Vec<(&str, &str)> = props.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_segment_without_equals_is_rejected() {
        let err = ConnectionProperties::parse("charset=utf8&garbage").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ExtractorError::Configuration { .. }
        ));
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(ConnectionProperties::parse("=value").is_err());
    }

    #[test]
    fn test_get_any_ignores_case() {
        let props = ConnectionProperties::parse("TrustServerCertificate=true").unwrap();
        assert_eq!(
            props.get_any(&["trust_server_certificate", "trustservercertificate"]),
            Some("true")
        );
        assert_eq!(props.get_any(&["encrypt"]), None);
    }

    proptest! {
        #[test]
        fn prop_well_formed_pairs_parse(
            pairs in proptest::collection::vec(("[a-z_]{1,12}", "[A-Za-z0-9_.-]{0,12}"), 0..8)
        ) {
            let input = pairs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            let props = ConnectionProperties::parse(&input).unwrap();
            for (key, _) in &pairs {
                let last = pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
                prop_assert_eq!(props.get(key), last);
            }
        }

        #[test]
        fn prop_bare_token_is_rejected(token in "[a-z]{1,12}") {
            prop_assert!(ConnectionProperties::parse(&token).is_err());
        }
    }
}
