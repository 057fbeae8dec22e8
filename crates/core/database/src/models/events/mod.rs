mod collaboration;
mod model;
mod ops;

pub use model::*;
pub use ops::*;
