//! Dataset country names that differ from the geometry's `ADMIN` names.
//!
//! The table is not exhaustive; unmatched names are simply not drawn.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// `(dataset name, geometry name)` pairs.
pub static ALIASES: &[(&str, &str)] = &[
    ("United States", "United States of America"),
    ("Russia", "Russian Federation"),
    ("Russian Federation", "Russian Federation"),
    ("Viet Nam", "Vietnam"),
    ("Korea, Rep.", "South Korea"),
    ("Korea, Dem. People's Rep.", "North Korea"),
    ("Congo, Dem. Rep.", "Democratic Republic of the Congo"),
    ("Congo, Rep.", "Republic of the Congo"),
    ("Gambia, The", "The Gambia"),
    ("Bahamas, The", "The Bahamas"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Hong Kong SAR, China", "Hong Kong S.A.R. of China"),
    ("Macao SAR, China", "Macao S.A.R, China"),
    ("Cote d'Ivoire", "Côte d’Ivoire"),
    ("Czechia", "Czech Republic"),
    ("Turkiye", "Turkey"),
    ("Syrian Arab Republic", "Syria"),
    ("Lao PDR", "Laos"),
    ("Kyrgyz Republic", "Kyrgyzstan"),
    ("Micronesia, Fed. Sts.", "Federated States of Micronesia"),
    ("Yemen, Rep.", "Yemen"),
    ("Venezuela, RB", "Venezuela"),
    ("Brunei Darussalam", "Brunei"),
    ("Eswatini", "Swaziland"),
    ("North Macedonia", "Macedonia"),
    ("Myanmar", "Myanmar"),
    ("Cabo Verde", "Cape Verde"),
    ("Timor-Leste", "East Timor"),
    ("São Tomé and Príncipe", "Sao Tome and Principe"),
    ("Sao Tome and Principe", "Sao Tome and Principe"),
    ("Palestine", "Palestine"),
    ("West Bank and Gaza", "Palestine"),
    ("Curacao", "Curaçao"),
    ("Sint Maarten (Dutch part)", "Sint Maarten"),
    // No single polygon for the Channel Islands
    ("Channel Islands", "Jersey"),
    ("Virgin Islands (U.S.)", "United States Virgin Islands"),
    ("Puerto Rico (US)", "Puerto Rico"),
    ("French Polynesia", "French Polynesia"),
    ("Greenland", "Greenland"),
];

static ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ALIASES.iter().copied().collect());

/// Geometry name for a dataset name, if the table has one.
pub fn alias_for(name: &str) -> Option<&'static str> {
    ALIAS_MAP.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_lookup() {
        assert_eq!(alias_for("United States"), Some("United States of America"));
        assert_eq!(alias_for("Korea, Rep."), Some("South Korea"));
        assert_eq!(alias_for("France"), None);
    }

    #[test]
    fn test_table_has_no_duplicate_sources() {
        assert_eq!(ALIAS_MAP.len(), ALIASES.len());
    }
}
