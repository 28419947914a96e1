use std::fmt;

use url::form_urlencoded;

/// Deterministic key for a request: endpoint path, sorted query, method.
///
/// Query names and values are percent-encoded so a value containing `&` or
/// `=` cannot pass for extra parameters. The path comes first so endpoint prefixes select every request made
/// against that endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn new(method: &str, path: &str, query: &[(String, String)]) -> Self {
        let mut pairs = query.iter().collect::<Vec<_>>();
        pairs.sort();

        let mut key = path.to_string();
        for (index, (name, value)) in pairs.into_iter().enumerate() {
            key.push(if index == 0 { '?' } else { '&' });
            key.extend(form_urlencoded::byte_serialize(name.as_bytes()));
            key.push('=');
            key.extend(form_urlencoded::byte_serialize(value.as_bytes()));
        }
        key.push('|');
        key.push_str(&method.to_ascii_uppercase());

        Self(key)
    }

    pub fn get(path: &str, query: &[(String, String)]) -> Self {
        Self::new("GET", path, query)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
