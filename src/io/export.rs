use anyhow::Result;
use std::io::Write;

use crate::application::BalanceService;
use crate::domain::{AccountId, format_cents};
use crate::storage::format_timestamp;

/// Writes an account's ledger out in portable formats.
pub struct Exporter<'a> {
    service: &'a BalanceService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BalanceService) -> Self {
        Self { service }
    }

    /// Export every transaction of `account_id` as CSV, oldest first.
    /// Returns the number of records written.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        account_id: AccountId,
        writer: W,
    ) -> Result<usize> {
        let records = self.service.get_all_transactions(account_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "account_id", "amount", "operation", "date"])?;

        for record in &records {
            csv_writer.write_record([
                record.id.to_string(),
                record.account_id.to_string(),
                format_cents(record.amount),
                record.operation.clone(),
                format_timestamp(record.date),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }
}
