//! Table schema derived from a file name and its header row.
//!
//! Every column is stored as unbounded `TEXT`; no type inference is
//! attempted. Names are taken verbatim. Characters the destination cannot
//! accept in an identifier are not rewritten, and duplicate headers are left
//! for the database to reject when the table is created.

use std::path::Path;

use itertools::Itertools;

pub const COLUMN_TYPE: &str = "TEXT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `CREATE TABLE` statement with one quoted `TEXT` column per header.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| format!("{} {COLUMN_TYPE}", quote_identifier(column)))
            .join(", ");
        format!(
            "CREATE TABLE {} ({columns})",
            quote_identifier(&self.table_name)
        )
    }

    /// Parameterized `INSERT` with one numbered placeholder per column.
    pub fn insert_sql(&self) -> String {
        let columns = self.columns.iter().map(|c| quote_identifier(c)).join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|idx| format!("?{idx}"))
            .join(", ");
        format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            quote_identifier(&self.table_name)
        )
    }
}

pub fn synthesize(path: &Path, headers: &[String]) -> TableSchema {
    TableSchema {
        table_name: table_name_for(path),
        columns: headers.to_vec(),
    }
}

/// File name with its last extension removed: `orders.2024.csv` becomes
/// `orders.2024`. Names without an extension, or ending in a bare dot, are
/// returned unchanged.
pub fn table_name_for(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[..idx].to_string(),
        _ => name,
    }
}

/// Wraps an identifier in double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_strips_only_last_extension() {
        assert_eq!(table_name_for(Path::new("data/orders.csv")), "orders");
        assert_eq!(table_name_for(Path::new("orders.2024.csv")), "orders.2024");
        assert_eq!(table_name_for(Path::new("README")), "README");
        assert_eq!(table_name_for(Path::new("trailing.")), "trailing.");
        assert_eq!(table_name_for(Path::new(".csv")), "");
    }

    #[test]
    fn ddl_quotes_spaces_and_reserved_words() {
        let schema = TableSchema {
            table_name: "order items".into(),
            columns: vec!["select".into(), "unit \"price\"".into()],
        };
        assert_eq!(
            schema.create_table_sql(),
            r#"CREATE TABLE "order items" ("select" TEXT, "unit ""price""" TEXT)"#
        );
        assert_eq!(
            schema.insert_sql(),
            r#"INSERT INTO "order items" ("select", "unit ""price""") VALUES (?1, ?2)"#
        );
    }
}
