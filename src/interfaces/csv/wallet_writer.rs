use crate::domain::account::WalletAccount;
use crate::error::Result;
use std::io::Write;

/// Writes wallet balances as CSV with header `owner,balance`.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one row per wallet, then flushes.
    pub fn write_wallets(&mut self, wallets: impl IntoIterator<Item = WalletAccount>) -> Result<()> {
        self.writer.write_record(["owner", "balance"])?;
        for wallet in wallets {
            let balance = wallet.balance.to_string();
            self.writer
                .write_record([wallet.owner.as_str(), balance.as_str()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
