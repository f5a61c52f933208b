//! Kernel module - server infrastructure and dependencies.

pub mod clock;
pub mod deps;
pub mod directory;
pub mod housekeeping;
pub mod test_dependencies;
pub mod traits;

pub use clock::SystemClock;
pub use deps::{PgDialogStore, ServerDeps};
pub use directory::PgDirectory;
pub use housekeeping::{run_housekeeping, start_housekeeping, HousekeepingReport};
pub use traits::*;
