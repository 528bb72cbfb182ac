//! Mock implementations for integration testing
//!
//! Stands in for yt-dlp so the download pipeline can run without network
//! access or external binaries.

pub mod mock_source;

pub use mock_source::{MockSource, MockSourceConfig};
