pub mod config;
pub mod text_input;
pub mod text_processing;

pub use config::*;
pub use text_input::TextInputState;
pub use text_processing::*;
