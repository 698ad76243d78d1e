//! Hit prediction toolkit library
//!
//! This library collects track metadata from the Spotify Web API and Last.fm,
//! flattens it into a feature table, and scores tables with a previously trained
//! "hit" / "not hit" classifier, either from the terminal or through a small
//! local dashboard.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local dashboard
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration objects built once from the environment
//! - `lastfm` - Last.fm chart export
//! - `management` - In-process state holders, CSV export and model loading
//! - `model` - Serialized classifier implementations
//! - `scoring` - Feature frame construction and batch scoring
//! - `server` - Dashboard HTTP server
//! - `spotify` - Spotify Web API client and ingestion pipeline
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use hitscout::{config, spotify};
//!
//! #[tokio::main]
//! async fn main() -> hitscout::Res<()> {
//!     config::load_env().await?;
//!     let spotify = config::SpotifyConfig::from_env()?;
//!     spotify::run_ingest(&spotify, &config::IngestSettings::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod lastfm;
pub mod management;
pub mod model;
pub mod scoring;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Issuing {} search queries", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Saved {} tracks to {}", count, path);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal conditions: missing credentials, a failed token
/// exchange or an unloadable model at dashboard startup. Code after the
/// macro does not run.
///
/// # Example
///
/// ```
/// error!("Failed to get access token: {}", err);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems such as a failed search page or a
/// throttled request; the pipeline keeps going with whatever data it has.
///
/// # Example
///
/// ```
/// warning!("Search error: {}", status);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
