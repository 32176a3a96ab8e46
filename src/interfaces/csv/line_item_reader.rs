use crate::domain::order::LineItem;
use crate::error::{GatewayError, Result};
use std::io::Read;

/// Reads order line items from a CSV source.
///
/// Expects a `name,price,quantity` header (`count` is accepted for the last
/// column). Rows come back in file order, which is the order they are signed in.
pub struct LineItemReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LineItemReader<R> {
    /// Creates a new `LineItemReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes line items.
    pub fn line_items(self) -> impl Iterator<Item = Result<LineItem>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(GatewayError::from))
    }

    /// Reads every row, stopping at the first malformed one.
    pub fn read_all(self) -> Result<Vec<LineItem>> {
        self.line_items().collect()
    }
}
