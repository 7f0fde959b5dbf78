//! Repository reference parsing.
//!
//! Two grammars are accepted, tried in order:
//! - `[http[s]://][www.]github.com/owner/name[.git][/]`
//! - bare `owner/name[.git]`
//!
//! Anything else is rejected before any network call is made.

use std::fmt;

use crate::error::{AppError, Result};

const HOST: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');

        let candidate = strip_host(trimmed).unwrap_or(trimmed);
        let mut segments = candidate.split('/');

        let (Some(owner), Some(name), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(AppError::InvalidReference(trimmed.to_string()));
        };
        let name = name.strip_suffix(".git").unwrap_or(name);

        if !is_valid_owner(owner) || !is_valid_name(name) {
            return Err(AppError::InvalidReference(trimmed.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Returns the `owner/name...` remainder when `input` is a URL on the repository host.
fn strip_host(input: &str) -> Option<&str> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.strip_prefix(HOST)?.strip_prefix('/')
}

// Owners are user or organisation logins: alphanumerics and hyphens.
fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
