//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

const EMPTY: &str = "No results found.";

/// Format data as a rounded, human-oriented table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return EMPTY.to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format data as a borderless table, one row per line, for scripts
pub fn format_plain_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return EMPTY.to_string();
    }

    let mut table = Table::new(data);
    table.with(Style::blank());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "TITLE")]
        title: String,
    }

    fn rows() -> Vec<TestRow> {
        vec![
            TestRow {
                id: 1,
                title: "Two Sum".to_string(),
            },
            TestRow {
                id: 2,
                title: "LRU Cache".to_string(),
            },
        ]
    }

    #[test]
    fn test_empty_tables() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
        assert_eq!(format_plain_table(&items), "No results found.");
    }

    #[test]
    fn test_format_table_uses_rounded_style() {
        let result = format_table(&rows());

        assert!(result.contains("TITLE"));
        assert!(result.contains("LRU Cache"));
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_plain_table_one_line_per_row() {
        let result = format_plain_table(&rows());

        assert_eq!(result.lines().count(), 3);
        assert!(result.lines().nth(1).unwrap().contains("Two Sum"));
    }
}
