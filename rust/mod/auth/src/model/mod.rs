mod account;
mod contact;
mod session;

pub use account::*;
pub use contact::*;
pub use session::*;
