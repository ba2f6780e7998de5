#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod layout;
pub mod mirror;
pub mod platform;
pub mod settings;

pub use layout::{bin_dir_name, tool_file_name, EnvName, HomeLayout, NameError, BASE_ENV, HOME_ENV};
pub use mirror::{
    default_candidates, DownloadSource, MirrorCandidate, OFFICIAL_DOWNLOAD_BASE, OFFICIAL_MIRROR,
};
pub use platform::{release_arch, AssetKind, Platform};
pub use settings::{save_mirror, MirrorPreference, Settings};
