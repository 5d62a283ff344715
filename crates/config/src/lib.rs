//! Pulse configuration.
//!
//! Options reach the client from two places: command-line flags and the TOML
//! config file. Both are merged into a single flat dotted-key map, the
//! [`ConfigView`]: flags live under their bare flag name (`entity`,
//! `hide-branch-names`), file options under `section.key`
//! (`settings.hide_branch_names`, `internal.backoff_at`).
//!
//! Most logical options have a history of spellings. Lookup therefore goes
//! through ordered alias lists where the first present key wins, encoding
//! the precedence chain: flag, then the primary config key, then deprecated
//! config keys.
//!
//! # Example config file
//!
//! ```toml
//! [settings]
//! api_key = "00000000-0000-4000-8000-000000000000"
//! hide_branch_names = "true"
//!
//! [projectmap]
//! "projects/foo" = "My Awesome Project"
//!
//! [internal]
//! backoff_at = "2021-08-30T18:50:42-03:00"
//! backoff_retries = "3"
//! ```

pub mod backoff;
mod error;
mod file;
mod view;

pub use backoff::BackoffState;
pub use error::{ConfigError, Result};
pub use file::{default_config_path, load_file, update_section};
pub use view::ConfigView;
