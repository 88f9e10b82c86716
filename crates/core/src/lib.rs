pub mod age;
pub mod config;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod models;
pub mod normalize;
pub mod ordered;
pub mod patterns;
pub mod scan;
pub mod tags;

pub use crate::config::RenameConfig;
pub use crate::error::{Error, Result};
pub use crate::metadata::{MediaInfoCli, MetadataProvider, RawTrack, TrackKind};
pub use crate::models::*;
pub use crate::scan::{scan, scan_with_progress, ScanConfig};
