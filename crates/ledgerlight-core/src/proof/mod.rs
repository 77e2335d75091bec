pub mod accumulator;
pub mod accumulator_proof;
pub mod error;
pub mod range_proof;
pub mod sparse_merkle;

pub use accumulator::*;
pub use accumulator_proof::*;
pub use error::*;
pub use range_proof::*;
pub use sparse_merkle::*;
