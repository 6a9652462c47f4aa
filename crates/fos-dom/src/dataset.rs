//! DOMStringMap (dataset)
//!
//! Implements dataset for data-* attribute access.

use std::collections::BTreeMap;

/// DOMStringMap for data-* attributes, keyed by camelCase name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMStringMap {
    data: BTreeMap<String, String>,
}

impl DOMStringMap {
    /// Create empty string map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get value by camelCase key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    /// Set value by camelCase key, returns the previous value
    pub fn set(&mut self, key: &str, value: &str) -> Option<String> {
        self.data.insert(key.to_string(), value.to_string())
    }

    /// Delete by key
    pub fn delete(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert key to attribute name
    pub fn to_attribute_name(key: &str) -> String {
        format!("data-{}", to_kebab_case(key))
    }

    /// Get as attribute pairs
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(k, v)| (Self::to_attribute_name(k), v.clone()))
            .collect()
    }
}

/// Convert camelCase to kebab-case
fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("userId"), "user-id");
        assert_eq!(to_kebab_case("firstName"), "first-name");
        assert_eq!(to_kebab_case("plain"), "plain");
    }

    #[test]
    fn test_set_get_delete() {
        let mut map = DOMStringMap::new();
        assert_eq!(map.set("userName", "John"), None);
        assert_eq!(map.set("userName", "Jane"), Some("John".to_string()));

        assert_eq!(map.get("userName"), Some("Jane"));
        assert_eq!(
            map.to_attributes(),
            vec![("data-user-name".to_string(), "Jane".to_string())]
        );

        assert!(map.delete("userName").is_some());
        assert!(map.is_empty());
    }
}
