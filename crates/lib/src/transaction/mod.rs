pub mod builder;
pub mod data;
pub mod ptb;

pub use builder::{build_batch_transaction, SponsorOptions};
pub use data::{GasData, TransactionData};
pub use ptb::{Argument, Command, Input, TransactionKind};
