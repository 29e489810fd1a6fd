//! Filter expression builders for the data service's `filter` query parameter.
//!
//! The service accepts SQL-ish predicates (`mac = 'aa:bb'`,
//! `mac in ('a','b')`, `user_id = 7`). Values are quoted here with embedded
//! single quotes doubled, so callers never interpolate raw strings.

/// Quote a string value for use in a filter expression.
///
/// Doubles embedded single quotes: `o'neill` becomes `'o''neill'`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `mac = '<mac>'`
pub fn mac_eq(mac: &str) -> String {
    format!("mac = {}", quote(mac))
}

/// `mac in ('<a>','<b>',...)`
pub fn mac_in<'a>(macs: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = macs.into_iter().map(quote).collect();
    format!("mac in ({})", quoted.join(","))
}

/// `user_id = <id>`
pub fn user_eq(user_id: i64) -> String {
    format!("user_id = {user_id}")
}

/// `group_id = '<id>'`
pub fn group_eq(group_id: &str) -> String {
    format!("group_id = {}", quote(group_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_embedded_single_quotes() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("o'neill"), "'o''neill'");
    }

    #[test]
    fn mac_predicates() {
        assert_eq!(mac_eq("aa:bb:cc:dd:ee:ff"), "mac = 'aa:bb:cc:dd:ee:ff'");
        assert_eq!(mac_in(["a", "b"]), "mac in ('a','b')");
        assert_eq!(mac_in(["solo"]), "mac in ('solo')");
    }

    #[test]
    fn id_predicates() {
        assert_eq!(user_eq(42), "user_id = 42");
        assert_eq!(group_eq("5f1e"), "group_id = '5f1e'");
    }
}
