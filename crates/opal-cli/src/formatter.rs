//! Output formatting for query results.

use opal_sql::executor::ResultSet;

/// Formats a result set as an aligned text table.
pub fn format_table(result: &ResultSet) -> String {
    let mut output = String::new();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    let rendered: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    for (i, column) in result.columns.iter().enumerate() {
        if i > 0 {
            output.push_str(" | ");
        }
        output.push_str(&format!("{:width$}", column, width = widths[i]));
    }
    output.push('\n');

    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            output.push_str("-+-");
        }
        output.push_str(&"-".repeat(*width));
    }
    output.push('\n');

    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                output.push_str(" | ");
            }
            output.push_str(&format!("{:width$}", cell, width = widths[i]));
        }
        output.push('\n');
    }

    output.push_str(&format!("({} rows)\n", result.num_rows()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_sql::executor::Value;

    #[test]
    fn test_format_table() {
        let result = ResultSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![Value::integer(1), Value::text("taro")],
                vec![Value::integer(2), Value::Null],
            ],
        };

        let output = format_table(&result);
        assert!(output.contains("id | name"));
        assert!(output.contains("1  | taro"));
        assert!(output.contains("NULL"));
        assert!(output.contains("(2 rows)"));
    }

    #[test]
    fn test_format_empty_result() {
        let result = ResultSet {
            columns: vec!["x".to_string()],
            rows: vec![],
        };
        let output = format_table(&result);
        assert!(output.contains("(0 rows)"));
    }
}
