//! Column-ordered buffer of encoded query results.

use dump_core::{ColumnMeta, Database, DumpError, Encoder, Result, RowStream, Value};
use futures::StreamExt;
use tracing::debug;

/// One column of a [`TableData`]: its metadata and the encoded literal of every buffered row
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub meta: ColumnMeta,
    pub literals: Vec<String>,
}

/// Encoded snapshot (or batch) of one query's result.
///
/// Columns keep the order of the result metadata and every column holds the same
/// number of literals.
#[derive(Debug, Clone)]
pub struct TableData {
    columns: Vec<TableColumn>,
    rows: usize,
}

impl TableData {
    /// Empty buffer with the given columns
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        let columns = columns
            .into_iter()
            .map(|meta| TableColumn {
                meta,
                literals: Vec::new(),
            })
            .collect();
        Self { columns, rows: 0 }
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.meta.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Literals of row `index`, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| c.literals[index].as_str())
                .collect(),
        )
    }

    /// Encode one decoded row and append it
    pub fn push_row(&mut self, row: &[Value], encoder: &mut Encoder) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DumpError::database(
                "buffering row",
                format!(
                    "row has {} values but the result has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            let literal = encoder.encode(&column.meta, value);
            column.literals.push(literal);
        }
        self.rows += 1;
        Ok(())
    }

    /// Drop the buffered rows, keeping the columns
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.literals.clear();
        }
        self.rows = 0;
    }

    /// Read up to `limit` rows (all remaining rows when `None`) from the stream.
    /// Returns the number of rows read; fewer than `limit` means the stream is exhausted.
    pub async fn fill(
        &mut self,
        rows: &mut RowStream,
        limit: Option<usize>,
        encoder: &mut Encoder,
    ) -> Result<usize> {
        let mut read = 0;
        while limit.map_or(true, |limit| read < limit) {
            let Some(row) = rows.next().await else {
                break;
            };
            self.push_row(&row?, encoder)?;
            read += 1;
        }
        Ok(read)
    }
}

/// Fail with [`DumpError::InvalidQueryKind`] unless the query starts with `SELECT`
pub fn ensure_select(query: &str) -> Result<()> {
    let head = query.trim_start().get(..6).unwrap_or_default();
    if head.eq_ignore_ascii_case("SELECT") {
        Ok(())
    } else {
        Err(DumpError::InvalidQueryKind(query.to_string()))
    }
}

/// Run a query and buffer its whole result
pub async fn build_table_data<D: Database + ?Sized>(
    query: &str,
    db: &D,
    encoder: &mut Encoder,
) -> Result<TableData> {
    ensure_select(query)?;

    let mut result = db.execute_query(query).await?;
    let mut table = TableData::new(result.columns);
    let rows = table.fill(&mut result.rows, None, encoder).await?;
    debug!("Buffered {rows} rows for query '{query}'");

    Ok(table)
}
