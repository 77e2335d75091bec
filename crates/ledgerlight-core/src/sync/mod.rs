pub mod client;
pub mod consistency;
pub mod error;
pub mod state;

pub use client::*;
pub use consistency::*;
pub use error::*;
pub use state::*;
