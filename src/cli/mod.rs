//! # CLI Module
//!
//! User-facing commands of hitscout. Each command reads its configuration
//! object, delegates to the library modules and reports through the
//! `info!` / `success!` / `warning!` / `error!` macros.
//!
//! ## Commands
//!
//! - [`fetch`] - Spotify ingestion: search, audio features, genres, CSV export
//! - [`lastfm`] - Last.fm global top tracks chart to CSV
//! - [`predict`] - score a CSV in the terminal with the trained model
//! - [`serve`] - start the local prediction dashboard
//!
//! ## Error Handling
//!
//! Only startup conditions are fatal: missing credentials, a failed token
//! exchange, an unloadable model. Everything that goes wrong while fetching
//! is reported as a warning and the command carries on with partial data.
//!
//! ## Usage Patterns
//!
//! ```bash
//! hitscout fetch                              # default queries, 100 tracks
//! hitscout fetch --quota 250 --feature-batch-size 100 --output tracks.csv
//! hitscout lastfm --limit 50
//! hitscout predict spotify_tracks.csv --model-dir Model
//! hitscout serve --open
//! ```

mod fetch;
mod lastfm;
mod predict;
mod serve;

pub use fetch::fetch;
pub use lastfm::lastfm;
pub use predict::predict;
pub use serve::serve;
