use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Columns a transaction listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Date,
    Amount,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Date => "date",
            SortField::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Ordering of a transaction listing. Parsed from strings such as `date`,
/// `amount` or `-id` (a leading `-` means descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }

    /// The `ORDER BY` clause for this sort. Ties are always broken by id so
    /// that pages never overlap.
    pub fn order_by(&self) -> &'static str {
        match (self.field, self.order) {
            (SortField::Id, SortOrder::Asc) => "id ASC",
            (SortField::Id, SortOrder::Desc) => "id DESC",
            (SortField::Date, SortOrder::Asc) => "date ASC, id ASC",
            (SortField::Date, SortOrder::Desc) => "date DESC, id DESC",
            (SortField::Amount, SortOrder::Asc) => "amount ASC, id ASC",
            (SortField::Amount, SortOrder::Desc) => "amount DESC, id DESC",
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::asc(SortField::Date)
    }
}

impl FromStr for Sort {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (order, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, trimmed),
        };

        let field = match name.to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "date" => SortField::Date,
            "amount" => SortField::Amount,
            _ => return Err(SortError(s.to_string())),
        };

        Ok(Self { field, order })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Asc => write!(f, "{}", self.field.as_str()),
            SortOrder::Desc => write!(f, "-{}", self.field.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported sort field '{0}' (expected one of: id, date, amount)")]
pub struct SortError(pub String);

/// One page of an account's transaction history. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32, sort: Sort) -> Self {
        Self { page, limit, sort }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).max(0) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT, Sort::default())
    }
}
