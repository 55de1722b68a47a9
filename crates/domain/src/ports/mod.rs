//! Interfaces of the collaborators the widget runtime depends on.

pub mod data;
pub mod render;
pub mod scheduler;
pub mod timeline;

pub use data::*;
pub use render::*;
pub use scheduler::*;
pub use timeline::*;
