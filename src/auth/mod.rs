//! Authentication primitives: session tokens, password hashing and
//! login throttling. Everything here is pure logic; HTTP wiring lives
//! in `middleware` and `handlers`.

pub mod password;
pub mod throttle;
pub mod token;

pub use throttle::{FixedWindowThrottle, ThrottleGate};
pub use token::{TokenCodec, Verification};
