// Application layer: the balance-mutation engine and the read side.
//
// `BalanceMutator` and `TransferOrchestrator` are the only writers of
// balances; `QueryService` never writes. `BalanceService` wires them
// together for callers.

pub mod error;
mod mutator;
mod query;
mod service;
mod transfer;

pub use error::*;
pub use mutator::{BalanceMutator, Mutation};
pub use query::QueryService;
pub use service::{BalanceService, BalanceView};
pub use transfer::TransferOrchestrator;
