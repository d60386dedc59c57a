use crate::domain::{AccountId, Cents, Channel};
use crate::storage::{LedgerStore, UnitOfWork};

use super::mutator::abort;
use super::{AppError, BalanceMutator, Mutation};

/// Moves money between two accounts: both legs share one unit of work, so
/// either both balances change (with one record each) or neither does.
#[derive(Debug, Clone)]
pub struct TransferOrchestrator {
    store: LedgerStore,
    mutator: BalanceMutator,
}

impl TransferOrchestrator {
    pub fn new(store: LedgerStore, mutator: BalanceMutator) -> Self {
        Self { store, mutator }
    }

    /// Transfer `amount` cents and return the new balance of `to`.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Cents,
    ) -> Result<Cents, AppError> {
        let debit = Mutation::debit(from, amount, Channel::Transfer);
        let credit = Mutation::credit(to, amount, Channel::Transfer);
        debit.validate()?;
        credit.validate()?;
        if from == to {
            return Err(AppError::SelfTransfer(from));
        }

        let mut uow = self.store.begin().await.map_err(AppError::AtomicUnitFailed)?;
        match self.apply_legs(&mut uow, &debit, &credit).await {
            Ok(balance) => {
                uow.commit().await.map_err(AppError::AtomicUnitFailed)?;
                tracing::info!(from, to, amount, "transfer committed");
                Ok(balance)
            }
            Err(err) => {
                abort(uow, &err).await;
                Err(err)
            }
        }
    }

    async fn apply_legs(
        &self,
        uow: &mut UnitOfWork,
        debit: &Mutation,
        credit: &Mutation,
    ) -> Result<Cents, AppError> {
        self.mutator.apply(uow, debit).await?;
        self.mutator.apply(uow, credit).await
    }
}
