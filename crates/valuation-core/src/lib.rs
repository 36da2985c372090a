pub mod error;
pub mod numeric;
pub mod report;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::*;
pub use report::*;
pub use traits::*;
pub use types::*;
