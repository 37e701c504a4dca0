//! SQL identifier quoting.

/// Reserved words that cannot appear as bare table or column names
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// Quote an identifier when the server would otherwise fold or reject it.
///
/// Lower-case names made of `[a-z0-9_$]` that start with a letter or `_` and are not
/// reserved words stay bare. Everything else is wrapped in double quotes with
/// embedded `"` doubled.
pub fn quote_identifier(name: &str) -> String {
    if is_bare_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_stay_bare() {
        assert_eq!(quote_identifier("orders"), "orders");
        assert_eq!(quote_identifier("order_lines_2"), "order_lines_2");
        assert_eq!(quote_identifier("_tmp$1"), "_tmp$1");
    }

    #[test]
    fn test_names_that_need_quotes() {
        assert_eq!(quote_identifier("OrderLines"), "\"OrderLines\"");
        assert_eq!(quote_identifier("order"), "\"order\"");
        assert_eq!(quote_identifier("user"), "\"user\"");
        assert_eq!(quote_identifier("2024_sales"), "\"2024_sales\"");
        assert_eq!(quote_identifier("line items"), "\"line items\"");
        assert_eq!(quote_identifier("größe"), "\"größe\"");
        assert_eq!(quote_identifier(""), "\"\"");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(quote_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
