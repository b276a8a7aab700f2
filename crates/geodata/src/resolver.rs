//! Dataset name → geometry name resolution.

use std::collections::BTreeMap;

use crate::aliases::alias_for;

/// Resolve `raw` against the names in `mapping`.
///
/// Tries, in order: exact match; the alias table (only if the alias target is
/// present in `mapping`); exact match after replacing `’` with `'`.
/// Returns the key as stored in `mapping`.
pub fn resolve<'m, V>(raw: &str, mapping: &'m BTreeMap<String, V>) -> Option<&'m str> {
    if let Some((key, _)) = mapping.get_key_value(raw) {
        return Some(key.as_str());
    }

    if let Some(alias) = alias_for(raw) {
        if let Some((key, _)) = mapping.get_key_value(alias) {
            return Some(key.as_str());
        }
    }

    if raw.contains('\u{2019}') {
        let ascii = raw.replace('\u{2019}', "'");
        if let Some((key, _)) = mapping.get_key_value(ascii.as_str()) {
            return Some(key.as_str());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(names: &[&str]) -> BTreeMap<String, ()> {
        names.iter().map(|n| (n.to_string(), ())).collect()
    }

    #[test]
    fn test_exact_match() {
        let m = mapping(&["France"]);
        assert_eq!(resolve("France", &m), Some("France"));
    }

    #[test]
    fn test_alias_match() {
        let m = mapping(&["United States of America"]);
        assert_eq!(resolve("United States", &m), Some("United States of America"));
    }

    #[test]
    fn test_exact_match_wins_over_alias() {
        let m = mapping(&["United States", "United States of America"]);
        assert_eq!(resolve("United States", &m), Some("United States"));
        assert_eq!(resolve("United States of America", &m), Some("United States of America"));
    }

    #[test]
    fn test_alias_requires_target_present() {
        let m = mapping(&["France"]);
        assert_eq!(resolve("United States", &m), None);
    }

    #[test]
    fn test_typographic_apostrophe() {
        let m = mapping(&["Cote d'Ivoire"]);
        assert_eq!(resolve("Cote d\u{2019}Ivoire", &m), Some("Cote d'Ivoire"));
    }

    #[test]
    fn test_unresolved() {
        let m = mapping(&["France"]);
        assert_eq!(resolve("Atlantis", &m), None);
        assert_eq!(resolve("", &m), None);
    }
}
