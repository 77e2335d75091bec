//! Data proven against a verified ledger info.
//!
//! Every `*WithProof` record comes from an untrusted node. Its `verify`
//! method checks it against a [`ProvenLedgerInfo`] and, on success, returns a
//! [`Proven`] value. `Proven` values can only be built by these methods, so
//! holding one means the checks passed.

pub mod account;
pub mod error;
pub mod event;
pub mod ledger_info;
pub mod transaction;
pub mod transaction_info;

pub use account::*;
pub use error::*;
pub use event::*;
pub use ledger_info::*;
pub use transaction::*;
pub use transaction_info::*;

/// A value that was verified against `ledger_info`.
///
/// The value is a private copy of what was verified; it is only ever handed
/// out by shared reference or as a clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proven<T> {
    value: T,
    ledger_info: ProvenLedgerInfo,
}

impl<T> Proven<T> {
    pub(crate) fn new(value: T, ledger_info: ProvenLedgerInfo) -> Self {
        Self { value, ledger_info }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// The ledger info this value was proven against.
    pub fn ledger_info(&self) -> &ProvenLedgerInfo {
        &self.ledger_info
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Derive a value that is proven by the same checks.
    pub(crate) fn map<U>(&self, f: impl FnOnce(&T) -> U) -> Proven<U> {
        Proven::new(f(&self.value), self.ledger_info.clone())
    }
}
