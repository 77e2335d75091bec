pub mod account;
pub mod address;
pub mod event;
pub mod ledger_info;
pub mod transaction;
pub mod validator;

pub use account::*;
pub use address::*;
pub use event::*;
pub use ledger_info::*;
pub use transaction::*;
pub use validator::*;
