pub mod catalog;
pub mod entities;
pub mod events;
pub mod models;
pub mod ports;

pub use catalog::*;
pub use entities::*;
pub use events::*;
pub use models::*;
pub use ports::*;
pub use signage_errors::{SignageError, SignageResult};
