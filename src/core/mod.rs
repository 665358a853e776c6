pub mod clock;
pub mod constants;
pub mod error;

pub use clock::{ Clock, ManualClock, SystemClock };
pub use error::{ KitError, KitResult };
