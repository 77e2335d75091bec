pub mod epoch_change;
pub mod validator_verifier;
pub mod verifier;
pub mod waypoint;

pub use epoch_change::*;
pub use validator_verifier::*;
pub use verifier::*;
pub use waypoint::*;
