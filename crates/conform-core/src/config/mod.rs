mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::{AdapterSettings, Config, TesterConfig};
pub use validation::warn_unknown_fields;
