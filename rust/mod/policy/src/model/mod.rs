mod plan;
mod policy;

pub use plan::*;
pub use policy::*;
