// Handler modules
pub mod fix;
pub mod input;
pub mod validate;

// Re-export all handler functions
pub use fix::{FixCommand, handle_fix};
pub use input::{Input, Source, collect_sources};
pub use validate::{ValidateCommand, handle_validate};
