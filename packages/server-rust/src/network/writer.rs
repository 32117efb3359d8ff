//! Incremental JSON writer for grid responses.
//!
//! The success envelope is produced chunk by chunk so large result sets are
//! never rendered into one in-memory document:
//!
//! ```text
//! {"data": [<row>,<row>,...],"draw":D,"recordsTotal":T,"recordsFiltered":F}
//! ```
//!
//! Each row object carries exactly the requested columns, in request order.
//! A column missing from the source row is omitted; keys the source row has
//! but the request did not ask for are never written.

use std::io::{self, Write};

use bytes::{BufMut, Bytes, BytesMut};
use tableaux_core::{Row, TableSchemaColumn};

const DATA_OPEN: &[u8] = b"{\"data\": [";

/// Emits `,` before every element except the first.
#[derive(Debug, Clone, Copy)]
pub struct Separator {
    first: bool,
}

impl Separator {
    #[must_use]
    pub const fn new() -> Self {
        Self { first: true }
    }

    /// Bytes to write in front of the next element.
    pub fn next(&mut self) -> &'static [u8] {
        if self.first {
            self.first = false;
            b""
        } else {
            b","
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pagination metadata written after the data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    /// Echo token from the request.
    pub draw: i64,
    pub records_total: u64,
    pub records_filtered: u64,
}

/// Writes one row object with keys in `columns` order.
///
/// # Errors
///
/// Propagates I/O errors from `out`.
pub fn write_row<W: Write>(out: &mut W, columns: &[TableSchemaColumn], row: &Row) -> io::Result<()> {
    out.write_all(b"{")?;
    let mut separator = Separator::new();
    for column in columns {
        let Some(value) = row.get(&column.path) else {
            continue;
        };
        out.write_all(separator.next())?;
        serde_json::to_writer(&mut *out, &column.path)?;
        out.write_all(b":")?;
        serde_json::to_writer(&mut *out, value)?;
    }
    out.write_all(b"}")
}

/// Writes the `{"error": ..., "draw": ...}` envelope.
///
/// # Errors
///
/// Propagates I/O errors from `out`.
pub fn write_error_envelope<W: Write>(out: &mut W, message: &str, draw: i64) -> io::Result<()> {
    out.write_all(&error_envelope(message, draw))
}

/// Renders the error envelope into a single buffer.
#[must_use]
pub fn error_envelope(message: &str, draw: i64) -> Bytes {
    let message = serde_json::Value::from(message).to_string();
    let mut buf = BytesMut::with_capacity(message.len() + 32);
    buf.put_slice(b"{\"error\":");
    buf.put_slice(message.as_bytes());
    buf.put_slice(format!(",\"draw\":{draw}}}").as_bytes());
    buf.freeze()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Rows,
    Done,
}

/// Iterator over the chunks of a success envelope.
///
/// Yields the opening bracket, then one chunk per row (with its leading
/// separator), then the trailer holding the pagination metadata. After an
/// error the iterator is exhausted.
#[derive(Debug)]
pub struct EnvelopeChunks {
    columns: Vec<TableSchemaColumn>,
    rows: std::vec::IntoIter<Row>,
    meta: PageMeta,
    state: State,
    separator: Separator,
}

impl EnvelopeChunks {
    #[must_use]
    pub fn new(columns: Vec<TableSchemaColumn>, rows: Vec<Row>, meta: PageMeta) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
            meta,
            state: State::Open,
            separator: Separator::new(),
        }
    }

    /// Drives every chunk into `out`.
    ///
    /// # Errors
    ///
    /// Propagates the first encoding or I/O error.
    pub fn write_to<W: Write>(self, out: &mut W) -> io::Result<()> {
        for chunk in self {
            out.write_all(&chunk?)?;
        }
        Ok(())
    }

    fn encode_row(&mut self, row: &Row) -> io::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(64).writer();
        buf.write_all(self.separator.next())?;
        write_row(&mut buf, &self.columns, row)?;
        Ok(buf.into_inner().freeze())
    }

    fn trailer(&self) -> Bytes {
        Bytes::from(format!(
            "],\"draw\":{},\"recordsTotal\":{},\"recordsFiltered\":{}}}",
            self.meta.draw, self.meta.records_total, self.meta.records_filtered
        ))
    }
}

impl Iterator for EnvelopeChunks {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Open => {
                self.state = State::Rows;
                Some(Ok(Bytes::from_static(DATA_OPEN)))
            }
            State::Rows => match self.rows.next() {
                Some(row) => {
                    let chunk = self.encode_row(&row);
                    if chunk.is_err() {
                        self.state = State::Done;
                    }
                    Some(chunk)
                }
                None => {
                    self.state = State::Done;
                    Some(Ok(self.trailer()))
                }
            },
            State::Done => None,
        }
    }
}

/// Writes a complete success envelope into `out`.
///
/// # Errors
///
/// Propagates I/O errors from `out`.
pub fn write_data_envelope<W: Write>(
    out: &mut W,
    columns: Vec<TableSchemaColumn>,
    rows: Vec<Row>,
    meta: PageMeta,
) -> io::Result<()> {
    EnvelopeChunks::new(columns, rows, meta).write_to(out)
}
