pub mod bitpath;
pub mod hash;
pub mod signature;

pub use bitpath::*;
pub use hash::*;
pub use signature::*;
