//! Plain-text tabulation for listing output.

use serde_json::Value;

const COLUMN_GAP: &str = "  ";

/// Renders `rows` under `headers` as space-aligned plain text.
///
/// Columns holding only numbers are right-aligned, everything else is
/// left-aligned. Lines carry no trailing whitespace.
pub fn render_plain_table(headers: &[String], rows: &[Vec<Value>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    let mut numeric = vec![!rows.is_empty(); columns];
    for (row, texts) in rows.iter().zip(&cells) {
        for column in 0..columns {
            let text = texts.get(column).map_or("", String::as_str);
            widths[column] = widths[column].max(text.chars().count());
            if !matches!(row.get(column), Some(Value::Number(_))) {
                numeric[column] = false;
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_line(
        headers.iter().map(String::as_str),
        &widths,
        &numeric,
    ));
    for texts in &cells {
        lines.push(render_line(
            (0..columns).map(|column| texts.get(column).map_or("", String::as_str)),
            &widths,
            &numeric,
        ));
    }
    lines.join("\n")
}

fn render_line<'a>(
    texts: impl Iterator<Item = &'a str>,
    widths: &[usize],
    numeric: &[bool],
) -> String {
    let padded: Vec<String> = texts
        .zip(widths.iter().zip(numeric))
        .map(|(text, (&width, &right))| {
            if right {
                format!("{text:>width$}")
            } else {
                format!("{text:<width$}")
            }
        })
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
