//! Player name/id resolution.
//!
//! Accept lists on the command line mix numeric ids and names
//! ("233; Salah; Virgil van Dijk"). Both the web name and the full
//! "first last" form resolve, case-insensitively.

use std::collections::HashMap;

use crate::types::GafferError;

use super::normalize::RawBootstrap;

/// Lookup table from normalized player names to ids.
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: HashMap<String, u32>,
}

impl NameIndex {
    pub fn from_bootstrap(bootstrap: &RawBootstrap) -> Self {
        let mut by_name = HashMap::new();
        for e in &bootstrap.elements {
            by_name.insert(normalize(&e.web_name), e.id);
            by_name.insert(normalize(&format!("{} {}", e.first_name, e.second_name)), e.id);
        }
        Self { by_name }
    }

    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.by_name.get(&normalize(name)).copied()
    }
}

/// Lowercase and collapse whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse a semicolon-separated accept list of ids and/or names into
/// player ids. An unresolvable token aborts with the offending text.
pub fn parse_accept_list(raw: &str, index: &NameIndex) -> Result<Vec<u32>, GafferError> {
    let mut ids = Vec::new();
    for token in raw.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        if token.chars().all(|c| c.is_ascii_digit()) {
            ids.push(
                token
                    .parse::<u32>()
                    .map_err(|_| GafferError::Resolution(token.to_string()))?,
            );
        } else {
            match index.resolve(token) {
                Some(id) => ids.push(id),
                None => return Err(GafferError::Resolution(token.to_string())),
            }
        }
    }
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
