// Common test utilities

pub mod app;
pub mod harness;

#[allow(unused_imports)]
pub use app::*;
#[allow(unused_imports)]
pub use harness::*;
