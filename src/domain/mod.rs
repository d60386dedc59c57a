mod account;
mod money;
mod page;
mod transaction;

pub use account::*;
pub use money::*;
pub use page::*;
pub use transaction::*;
