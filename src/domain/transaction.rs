use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AccountId, Cents, format_cents};

pub type TransactionId = i64;

/// A ledger entry. Written once, in the same unit of work as the balance
/// change it describes, and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Assigned by the store, strictly increasing
    pub id: TransactionId,
    pub account_id: AccountId,
    /// Magnitude of the movement in cents (always positive)
    pub amount: Cents,
    /// Human-readable description; carries the direction of the movement
    pub operation: String,
    /// When the record was inserted
    pub date: DateTime<Utc>,
}

/// Which way a balance mutation moves money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// Verb used at the start of the operation description.
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Credit => "Top-up",
            Direction::Debit => "Debit",
        }
    }

    /// Apply this direction to `balance`. `None` on overflow or if a debit
    /// would take the balance below zero.
    pub fn apply(&self, balance: Cents, amount: Cents) -> Option<Cents> {
        match self {
            Direction::Credit => balance.checked_add(amount),
            Direction::Debit => balance.checked_sub(amount).filter(|b| *b >= 0),
        }
    }
}

/// Where the money came from or went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    BankCard,
    Purchase,
    Transfer,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::BankCard => "bank_card",
            Channel::Purchase => "purchase",
            Channel::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The free-text `operation` written alongside a balance change,
/// e.g. "Debit by transfer 10.00".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reason {
    pub direction: Direction,
    pub channel: Channel,
    pub amount: Cents,
}

impl Reason {
    pub fn new(direction: Direction, channel: Channel, amount: Cents) -> Self {
        Self {
            direction,
            channel,
            amount,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} {}",
            self.direction.verb(),
            self.channel,
            format_cents(self.amount)
        )
    }
}
