//! Field aliasing and whitelisting.

use std::collections::{HashMap, HashSet};

use crate::error::QueryError;

/// Maps alias field names to canonical ones and optionally restricts explicit fields.
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    /// Alias to canonical name.
    aliases: HashMap<String, String>,
    /// Allowed canonical names.
    whitelist: HashSet<String>,
    /// Reject explicit fields missing from the whitelist.
    enforce: bool,
}

impl FieldResolver {
    /// Creates a resolver that accepts every field unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds alias mappings.
    pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds canonical names to the whitelist and turns enforcement on.
    pub fn with_whitelist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist.extend(fields.into_iter().map(Into::into));
        self.enforce = true;
        self
    }

    /// Turns whitelist enforcement on or off.
    pub fn enforce(mut self, enforce: bool) -> Self {
        self.enforce = enforce;
        self
    }

    /// Returns the canonical name for a field, or the field itself when it is not an alias.
    pub fn canonical<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases.get(field).map_or(field, String::as_str)
    }

    /// Resolves an explicit field written in a query.
    ///
    /// `*` is always accepted since `*:*` means match-all regardless of configuration.
    pub fn resolve(&self, field: &str, position: Option<usize>) -> Result<String, QueryError> {
        let canonical = self.canonical(field);
        if self.enforce && canonical != "*" && !self.whitelist.contains(canonical) {
            return Err(QueryError::field_validation(canonical, field, position));
        }
        Ok(canonical.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorKind;

    fn resolver() -> FieldResolver {
        FieldResolver::new()
            .with_aliases([("名称", "ti"), ("摘要", "ab")])
            .with_whitelist(["ti", "ab", "co"])
    }

    #[test]
    fn aliases_resolve_to_canonical() {
        let r = resolver();
        assert_eq!(r.resolve("名称", None).unwrap(), "ti");
        assert_eq!(r.resolve("ab", None).unwrap(), "ab");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = resolver().resolve("xx", Some(4)).unwrap_err();
        assert_eq!(
            err.kind,
            QueryErrorKind::FieldValidation {
                field: "xx".into(),
                token: "xx".into(),
                position: Some(4),
            }
        );
    }

    #[test]
    fn alias_to_unlisted_field_is_rejected() {
        let r = FieldResolver::new()
            .with_aliases([("date", "pd")])
            .with_whitelist(["ti"]);
        let err = r.resolve("date", None).unwrap_err();
        assert!(matches!(err.kind, QueryErrorKind::FieldValidation { ref field, ref token, .. }
            if field == "pd" && token == "date"));
    }

    #[test]
    fn enforcement_off_passes_through() {
        let r = resolver().enforce(false);
        assert_eq!(r.resolve("xx", None).unwrap(), "xx");
        assert_eq!(FieldResolver::new().resolve("anything", None).unwrap(), "anything");
    }

    #[test]
    fn star_is_always_accepted() {
        assert_eq!(resolver().resolve("*", None).unwrap(), "*");
    }
}
