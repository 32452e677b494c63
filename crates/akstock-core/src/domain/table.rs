use serde_json::{Map, Value};

/// Column-ordered tabular result returned by data sources.
///
/// Cells are JSON scalars; a missing value is `Value::Null`. Every row has
/// exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from JSON objects. Columns appear in order of first occurrence.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut table = Self::default();
        for record in records {
            let mut row = vec![Value::Null; table.columns.len()];
            for (key, value) in record {
                match table.column_index(&key) {
                    Some(index) => row[index] = value,
                    None => {
                        table.columns.push(key);
                        for existing in &mut table.rows {
                            existing.push(Value::Null);
                        }
                        row.push(value);
                    }
                }
            }
            table.rows.push(row);
        }
        table
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Rename every column for which `label` returns a replacement.
    pub fn relabel<F>(&mut self, mut label: F)
    where
        F: FnMut(&str) -> Option<&'static str>,
    {
        for column in &mut self.columns {
            if let Some(new_name) = label(column) {
                *column = new_name.to_owned();
            }
        }
    }

    /// Keep only the named columns, in the given order. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Self {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        Self {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Keep the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
    }

    /// Set `column` to `value` on every row, appending the column when absent.
    pub fn set_column(&mut self, column: &str, value: Value) {
        let index = match self.column_index(column) {
            Some(index) => index,
            None => {
                self.columns.push(column.to_owned());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
                self.columns.len() - 1
            }
        };
        for row in &mut self.rows {
            row[index] = value.clone();
        }
    }

    /// Rows as ordered JSON objects.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().map(|row| self.record(row, false)).collect()
    }

    /// Rows as ordered JSON objects with null cells replaced by `""`.
    pub fn filled_records(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().map(|row| self.record(row, true)).collect()
    }

    fn record(&self, row: &[Value], fill_nulls: bool) -> Map<String, Value> {
        self.columns
            .iter()
            .zip(row)
            .map(|(column, value)| {
                let value = if fill_nulls && value.is_null() {
                    Value::String(String::new())
                } else {
                    value.clone()
                };
                (column.clone(), value)
            })
            .collect()
    }
}

/// Render a cell the way it appears in delimited text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
