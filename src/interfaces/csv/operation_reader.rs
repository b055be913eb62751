use crate::domain::operation::Operation;
use crate::error::{CardError, Result};
use std::io::Read;

/// Streams card operations out of a batch CSV file.
///
/// The header row is `op, card, holder, type, account, limit, amount`. `op` is
/// one of `issue`, `deposit`, `withdraw`, `block` or `unblock`, and `card` is
/// the batch reference of the card. Only `issue` reads `holder`, `type`,
/// `account` and `limit`; only `deposit` and `withdraw` read `amount`.
///
/// Fields are trimmed and rows may stop after their last used column, so
/// `block, 7` is a complete row. A holder name containing a comma must be
/// quoted. A row that fails to parse yields an error in its place and the
/// stream carries on with the next row.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// One item per data row, in file order.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CardError::from))
    }
}
