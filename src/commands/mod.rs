//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and writes to an [`OutputWriter`](crate::output::OutputWriter).

pub mod run;
pub mod sessions;
pub mod settings;

pub use run::execute as run;
pub use sessions::execute as sessions;
pub use settings::execute as settings;
