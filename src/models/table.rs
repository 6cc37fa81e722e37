use crate::errors::AppError;
use csv::StringRecord;
use serde::de::DeserializeOwned;

/// In-memory CSV table. Cells are kept as strings; an empty cell is a null.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), AppError> {
        if row.len() != self.columns.len() {
            return Err(AppError::Validation(format!(
                "Row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns false when `from` is not a column.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn drop_column(&mut self, idx: usize) {
        if idx >= self.columns.len() {
            return;
        }
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Sets `name` to `value` on every row, adding the column if needed.
    pub fn with_constant_column(mut self, name: &str, value: &str) -> Self {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.to_string();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.to_string());
                }
            }
        }
        self
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Rewrites every cell of a column. A `None` from `f` nulls the cell.
    /// Returns how many non-null cells became null.
    pub fn map_column<F>(&mut self, idx: usize, mut f: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut nulled = 0;
        for row in &mut self.rows {
            let was_null = row[idx].is_empty();
            match f(&row[idx]) {
                Some(value) => row[idx] = value,
                None => {
                    if !was_null {
                        nulled += 1;
                    }
                    row[idx].clear();
                }
            }
        }
        nulled
    }

    /// Removes every row holding a null in any column. Returns the number removed.
    pub fn drop_nulls(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().all(|cell| !cell.is_empty()));
        before - self.rows.len()
    }

    /// Stacks tables vertically. Columns are the union in order of first
    /// appearance; cells missing from a table are null.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut out = Table::new(columns);
        for table in tables {
            let mapping: Vec<Option<usize>> = out
                .columns
                .iter()
                .map(|c| table.column_index(c))
                .collect();
            for row in table.rows {
                let aligned = mapping
                    .iter()
                    .map(|src| src.map(|i| row[i].clone()).unwrap_or_default())
                    .collect();
                out.rows.push(aligned);
            }
        }
        out
    }

    /// Deserializes every row into `T` by header name. Columns `T` does not
    /// name are ignored.
    pub fn deserialize_rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, AppError> {
        let headers = StringRecord::from(self.columns.clone());
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                StringRecord::from(row.clone())
                    .deserialize::<T>(Some(&headers))
                    .map_err(|e| AppError::Validation(format!("Row {}: {}", i + 1, e)))
            })
            .collect()
    }
}
