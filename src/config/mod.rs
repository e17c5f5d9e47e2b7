use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Key/value properties visible to a test class container
///
/// Every test class container gets one `Properties` service: the process
/// environment, overlaid with the inline properties the test class declares.
/// Inline properties win over environment variables of the same name.
#[derive(Clone, Default)]
pub struct Properties {
    values: Arc<DashMap<String, String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_env() -> Self {
        let properties = Self::default();
        for (key, value) in env::vars_os() {
            let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) else {
                tracing::debug!("Skipping non UTF-8 environment variable");
                continue;
            };
            properties.set(&key, &value);
        }
        properties
    }

    /// Overlay inline `key = value` entries
    pub fn with_inline<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value.as_ref());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Split an inline `"key = value"` declaration
///
/// Returns `None` when there is no `=` or the key is blank.
pub fn parse_inline(entry: &str) -> Option<(String, String)> {
    let (key, value) = entry.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}
