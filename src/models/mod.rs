pub mod prediction;
pub mod survey;

pub use prediction::*;
pub use survey::*;
