pub mod app;
pub mod common;
pub mod rotation;
pub mod shutdown;
