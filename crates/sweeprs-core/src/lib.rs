//! Core of sweeprs: reading browser password exports, grouping entries by
//! site, flagging weak and reused passwords, and writing the cleaned file.
//!
//! The terminal frontend drives everything through [`ReviewSession`].

pub mod domain;
pub mod error;
pub mod export;
pub mod generator;
pub mod grouping;
pub mod import;
pub mod models;
pub mod security;
pub mod session;
pub mod strength;

pub use domain::{normalize_url, site_url, UNKNOWN_DOMAIN};
pub use error::{ExportError, ImportError, SessionError};
pub use export::{export_csv, write_csv, ExportOptions};
pub use generator::{generate_password, options_strength, GeneratorOptions, OptionsStrength};
pub use grouping::group_by_domain;
pub use import::{import_file, parse_csv, parse_csv_str};
pub use models::{Entry, EntryId, Group, Status};
pub use security::{analyze, ReusedCluster, SecurityAnalysis, StatusCounts};
pub use session::{GroupSort, ReviewSession};
pub use strength::{password_strength, Strength, StrengthLabel};
