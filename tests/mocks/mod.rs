//! Test doubles for the chat and the download backend
//!
//! Both record every call so tests can assert on what reached the chat and
//! whether yt-dlp would have been started.

pub mod mock_gateway;
pub mod mock_source;

#[allow(unused_imports)]
pub use mock_gateway::{MockGateway, Sent};
#[allow(unused_imports)]
pub use mock_source::{MockSource, SourceBehavior};
