use chrono::Utc;

use crate::domain::{
    AccountId, Cents, Channel, Direction, Reason, format_cents, is_valid_account_id,
};
use crate::storage::{LedgerStore, UnitOfWork};

use super::AppError;

/// A single-account balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub account_id: AccountId,
    /// Magnitude in cents, must be positive
    pub amount: Cents,
    pub direction: Direction,
    pub channel: Channel,
}

impl Mutation {
    pub fn credit(account_id: AccountId, amount: Cents, channel: Channel) -> Self {
        Self {
            account_id,
            amount,
            direction: Direction::Credit,
            channel,
        }
    }

    pub fn debit(account_id: AccountId, amount: Cents, channel: Channel) -> Self {
        Self {
            account_id,
            amount,
            direction: Direction::Debit,
            channel,
        }
    }

    pub fn reason(&self) -> Reason {
        Reason::new(self.direction, self.channel, self.amount)
    }

    /// Checks that need no database access.
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_account_id(self.account_id) {
            return Err(AppError::InvalidAccountId(self.account_id));
        }
        if self.amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "amount must be positive, got {}",
                format_cents(self.amount)
            )));
        }
        Ok(())
    }
}

/// Changes one account's balance and appends the matching ledger record as
/// a single atomic unit. Holds no state besides the store handle.
#[derive(Debug, Clone)]
pub struct BalanceMutator {
    store: LedgerStore,
}

impl BalanceMutator {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Run `mutation` in its own unit of work and return the new balance.
    pub async fn mutate(&self, mutation: Mutation) -> Result<Cents, AppError> {
        mutation.validate()?;

        let mut uow = self.store.begin().await.map_err(AppError::AtomicUnitFailed)?;
        match self.apply(&mut uow, &mutation).await {
            Ok(balance) => {
                uow.commit().await.map_err(AppError::AtomicUnitFailed)?;
                tracing::debug!(
                    account_id = mutation.account_id,
                    direction = mutation.direction.verb(),
                    amount = mutation.amount,
                    balance,
                    "balance updated"
                );
                Ok(balance)
            }
            Err(err) => {
                abort(uow, &err).await;
                Err(err)
            }
        }
    }

    /// Apply `mutation` inside a unit of work owned by the caller. On error
    /// the caller must roll the unit back; nothing here is committed.
    pub async fn apply(&self, uow: &mut UnitOfWork, mutation: &Mutation) -> Result<Cents, AppError> {
        let account_id = mutation.account_id;

        let current = uow
            .read_balance(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;

        if mutation.direction == Direction::Debit && current < mutation.amount {
            return Err(AppError::InsufficientFunds {
                account_id,
                balance: current,
                required: mutation.amount,
            });
        }

        let new_balance = mutation
            .direction
            .apply(current, mutation.amount)
            .ok_or_else(|| {
                AppError::InvalidAmount(format!(
                    "balance of account {account_id} would overflow"
                ))
            })?;

        let updated = uow
            .conditional_update_balance(account_id, current, new_balance)
            .await?;
        if updated == 0 {
            return Err(AppError::AccountNotFound(account_id));
        }

        let reason = mutation.reason().to_string();
        let inserted = uow
            .insert_transaction(account_id, mutation.amount, &reason, Utc::now())
            .await
            .map_err(|err| {
                tracing::error!(account_id, "ledger insert failed: {err:#}");
                AppError::LedgerWriteFailed(account_id)
            })?;
        if inserted != 1 {
            return Err(AppError::LedgerWriteFailed(account_id));
        }

        Ok(new_balance)
    }
}

/// Roll back a failed unit of work. Dropping the transaction would roll it
/// back too; doing it explicitly surfaces rollback failures in the logs.
pub(crate) async fn abort(uow: UnitOfWork, cause: &AppError) {
    if cause.is_client_error() {
        tracing::warn!("rolling back unit of work: {cause}");
    } else {
        tracing::error!("rolling back unit of work: {cause}");
    }

    if let Err(err) = uow.rollback().await {
        tracing::error!("rollback failed: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_reason() {
        let top_up = Mutation::credit(1, 500, Channel::BankCard);
        assert_eq!(top_up.reason().to_string(), "Top-up by bank_card 5.00");

        let debit = Mutation::debit(1, 1234, Channel::Purchase);
        assert_eq!(debit.reason().to_string(), "Debit by purchase 12.34");
    }

    #[test]
    fn test_mutation_validation() {
        assert!(Mutation::credit(1, 1, Channel::BankCard).validate().is_ok());
        assert!(matches!(
            Mutation::credit(0, 100, Channel::BankCard).validate(),
            Err(AppError::InvalidAccountId(0))
        ));
        assert!(matches!(
            Mutation::debit(1, 0, Channel::Purchase).validate(),
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            Mutation::debit(1, -50, Channel::Purchase).validate(),
            Err(AppError::InvalidAmount(_))
        ));
    }
}
