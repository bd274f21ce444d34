pub mod enums;
pub mod models;
pub mod validation;

pub use enums::*;
pub use models::*;
pub use validation::*;
