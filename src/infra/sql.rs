//! SQL identifier and literal quoting for MySQL, plus the statement builders
//! the loader and purge workloads need.

use crate::domain::SqlValue;

/// Quote identifier with backticks, doubling embedded backticks.
/// Dotted names (`schema.table`) are quoted per part.
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("`{}`", part.replace('`', "``")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape string literal: backslashes and single quotes are escaped, result is single-quoted.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub fn render_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) => quote_literal(s),
    }
}

/// Multi-row insert: `INSERT INTO t (a, b) VALUES (..), (..)`.
/// An empty column list omits the column clause.
pub fn build_insert(table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> String {
    let mut sql = format!("INSERT INTO {}", quote_ident(table));
    if !columns.is_empty() {
        let cols = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ({})", cols));
    }
    sql.push_str(" VALUES ");

    let tuples = rows
        .iter()
        .map(|row| {
            let values = row.iter().map(render_value).collect::<Vec<_>>().join(", ");
            format!("({})", values)
        })
        .collect::<Vec<_>>()
        .join(", ");
    sql.push_str(&tuples);
    sql
}

/// `DELETE ... LIMIT n`; the condition is passed through verbatim.
pub fn build_delete_limited(table: &str, condition: Option<&str>, limit: u64) -> String {
    match condition.map(str::trim).filter(|c| !c.is_empty()) {
        Some(cond) => format!(
            "DELETE FROM {} WHERE {} LIMIT {}",
            quote_ident(table),
            cond,
            limit
        ),
        None => format!("DELETE FROM {} LIMIT {}", quote_ident(table), limit),
    }
}

/// Deletes the `limit` rows with the highest `key_column` values.
pub fn build_delete_newest(table: &str, key_column: &str, limit: u64) -> String {
    format!(
        "DELETE FROM {} ORDER BY {} DESC LIMIT {}",
        quote_ident(table),
        quote_ident(key_column),
        limit
    )
}

pub fn build_truncate(table: &str) -> String {
    format!("TRUNCATE TABLE {}", quote_ident(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_simple() {
        assert_eq!(quote_ident("Ninja"), "`Ninja`");
    }

    #[test]
    fn quote_ident_with_backtick() {
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn quote_ident_reserved_word() {
        assert_eq!(quote_ident("Rank"), "`Rank`");
    }

    #[test]
    fn quote_ident_qualified() {
        assert_eq!(quote_ident("bdd2.Ninja"), "`bdd2`.`Ninja`");
    }

    #[test]
    fn delete_newest_orders_by_key_descending() {
        assert_eq!(
            build_delete_newest("Ninja", "id", 500),
            "DELETE FROM `Ninja` ORDER BY `id` DESC LIMIT 500"
        );
    }

    #[test]
    fn quote_literal_simple() {
        assert_eq!(quote_literal("hello"), "'hello'");
    }

    #[test]
    fn quote_literal_with_single_quote() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn quote_literal_with_backslash() {
        assert_eq!(quote_literal(r"C:\tmp"), r"'C:\\tmp'");
    }

    #[test]
    fn quote_literal_empty() {
        assert_eq!(quote_literal(""), "''");
    }

    mod build_insert {
        use super::*;

        #[test]
        fn renders_multi_row_values() {
            let rows = vec![
                vec![SqlValue::from("Ninja_0"), SqlValue::Int(90), SqlValue::Int(120)],
                vec![SqlValue::from("Ninja_1"), SqlValue::Null, SqlValue::Float(1.5)],
            ];
            let columns = vec!["name".to_string(), "maxWeight".to_string(), "life".to_string()];

            assert_eq!(
                build_insert("Ninja", &columns, &rows),
                "INSERT INTO `Ninja` (`name`, `maxWeight`, `life`) VALUES ('Ninja_0', 90, 120), ('Ninja_1', NULL, 1.5)"
            );
        }

        #[test]
        fn without_columns_omits_column_list() {
            let rows = vec![vec![SqlValue::Int(1)]];
            assert_eq!(build_insert("t", &[], &rows), "INSERT INTO `t` VALUES (1)");
        }
    }

    mod build_delete_limited {
        use super::*;

        #[test]
        fn with_condition() {
            assert_eq!(
                build_delete_limited("Ninja", Some("life < 60"), 1000),
                "DELETE FROM `Ninja` WHERE life < 60 LIMIT 1000"
            );
        }

        #[test]
        fn blank_condition_is_ignored() {
            assert_eq!(
                build_delete_limited("Ninja", Some("  "), 10),
                "DELETE FROM `Ninja` LIMIT 10"
            );
        }
    }

    #[test]
    fn truncate_quotes_table() {
        assert_eq!(build_truncate("Rank"), "TRUNCATE TABLE `Rank`");
    }
}
