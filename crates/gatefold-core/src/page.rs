//! Page identifiers and the query parameters a page load consumes.

use std::fmt;
use std::str::FromStr;

use tracing::debug;
use uuid::Uuid;

use crate::error::PageIdError;

/// Identifier of a page in the upstream workspace.
///
/// The upstream writes ids both as dashed UUIDs and as 32-character compact
/// hex; both parse here. The canonical form is compact, which is what page
/// URLs carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    /// Parse a page id from either UUID form.
    ///
    /// # Errors
    ///
    /// Returns [`PageIdError::Invalid`] if the input is not a UUID.
    pub fn parse(input: &str) -> Result<Self, PageIdError> {
        let trimmed = input.trim();
        Uuid::try_parse(trimmed)
            .map(|uuid| Self(uuid.as_simple().to_string()))
            .map_err(|_| PageIdError::Invalid {
                input: trimmed.to_owned(),
            })
    }

    /// The compact (32 hex characters, no dashes) form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dashed UUID form the upstream API expects.
    #[must_use]
    pub fn dashed(&self) -> String {
        let id = &self.0;
        format!(
            "{}-{}-{}-{}-{}",
            &id[0..8],
            &id[8..12],
            &id[12..16],
            &id[16..20],
            &id[20..32]
        )
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PageId {
    type Err = PageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Query parameters consumed on a page load.
///
/// - `key` — role-unlock token, checked on every load of a gated page.
/// - `modal` — overlay auto-open target on a section-list page.
/// - `from` — originating section page id attached to detail links.
/// - `v` — opaque version token passed through to the upstream, never
///   interpreted.
///
/// Unknown parameters and unparsable page ids are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Role-unlock token (`key`).
    pub key: Option<String>,
    /// Overlay auto-open target (`modal`).
    pub modal: Option<PageId>,
    /// Originating section page id (`from`).
    pub from: Option<PageId>,
    /// Opaque version token (`v`).
    pub version: Option<String>,
}

impl PageQuery {
    /// Parse a raw query string (with or without the leading `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let Ok(value) = urlencoding::decode(value) else {
                debug!(name, "dropping query parameter with invalid encoding");
                continue;
            };

            match name {
                "key" => parsed.key = Some(value.into_owned()),
                "modal" => parsed.modal = parse_id_param(name, &value),
                "from" => parsed.from = parse_id_param(name, &value),
                "v" => parsed.version = Some(value.into_owned()),
                _ => {}
            }
        }

        parsed
    }
}

fn parse_id_param(name: &str, value: &str) -> Option<PageId> {
    match PageId::parse(value) {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(name, value, "dropping query parameter with invalid page id");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COMPACT: &str = "31188738e14680a3bff7de9e9ed62509";
    const DASHED: &str = "31188738-e146-80a3-bff7-de9e9ed62509";

    #[test]
    fn parses_compact_form() {
        let id = PageId::parse(COMPACT).unwrap();
        assert_eq!(id.as_str(), COMPACT);
    }

    #[test]
    fn parses_dashed_form_to_compact() {
        let id = PageId::parse(DASHED).unwrap();
        assert_eq!(id.as_str(), COMPACT);
    }

    #[test]
    fn dashed_round_trips() {
        let id = PageId::parse(COMPACT).unwrap();
        assert_eq!(id.dashed(), DASHED);
        assert_eq!(PageId::parse(&id.dashed()).unwrap(), id);
    }

    #[test]
    fn rejects_garbage() {
        assert!(PageId::parse("not-a-page").is_err());
        assert!(PageId::parse("").is_err());
    }

    #[test]
    fn query_parses_all_known_parameters() {
        let query = PageQuery::parse(&format!("key=SECRET&modal={COMPACT}&from={DASHED}&v=ver1"));
        assert_eq!(query.key.as_deref(), Some("SECRET"));
        assert_eq!(query.modal.as_ref().unwrap().as_str(), COMPACT);
        assert_eq!(query.from.as_ref().unwrap().as_str(), COMPACT);
        assert_eq!(query.version.as_deref(), Some("ver1"));
    }

    #[test]
    fn query_tolerates_leading_question_mark_and_unknowns() {
        let query = PageQuery::parse("?v=abc&utm_source=share");
        assert_eq!(query.version.as_deref(), Some("abc"));
        assert_eq!(query.key, None);
    }

    #[test]
    fn query_drops_unparsable_page_ids() {
        let query = PageQuery::parse("modal=not-a-uuid");
        assert_eq!(query.modal, None);
    }

    #[test]
    fn query_decodes_percent_encoding() {
        let query = PageQuery::parse("key=SPACED%20KEY");
        assert_eq!(query.key.as_deref(), Some("SPACED KEY"));
    }

    #[test]
    fn empty_query_is_default() {
        assert_eq!(PageQuery::parse(""), PageQuery::default());
        assert_eq!(PageQuery::parse("?"), PageQuery::default());
    }
}
