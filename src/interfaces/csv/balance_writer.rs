use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct BalanceRecord {
    account: usize,
    balance: i64,
}

/// Writes final account balances as CSV with an `account,balance` header.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one row per account, in index order, and flushes.
    pub fn write_balances(&mut self, balances: &[i64]) -> Result<()> {
        for (account, balance) in balances.iter().copied().enumerate() {
            self.writer.serialize(BalanceRecord { account, balance })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_balances() {
        let mut buffer = Vec::new();
        BalanceWriter::new(&mut buffer)
            .write_balances(&[50, 150, 100])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "account,balance\n0,50\n1,150\n2,100\n");
    }

    #[test]
    fn test_write_no_balances() {
        let mut buffer = Vec::new();
        BalanceWriter::new(&mut buffer).write_balances(&[]).unwrap();
        assert!(buffer.is_empty());
    }
}
