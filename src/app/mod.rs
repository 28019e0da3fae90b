pub mod cli;
pub mod error;

// Re-export commonly used types
pub use cli::run_until_shutdown;
pub use error::AppError;
