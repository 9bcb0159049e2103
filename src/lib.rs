pub mod cache;
pub mod client;
pub mod config;
pub mod date;
pub mod entity;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod quarantine;
pub mod report;
pub mod rss;
pub mod source;
pub mod util;

pub use cache::{CacheEntry, TtlCache};
pub use config::Settings;
pub use entity::{merge_episodes, Episode, Podcast};
pub use error::IngestError;
pub use pipeline::Pipeline;
pub use report::{LogReporter, MemoryReporter, Reporter};
pub use rss::CutoffStrategy;
pub use source::Source;

// default impl of the feed fetcher
pub fn get_fetcher(settings: &Settings) -> impl client::Fetcher {
    client::Client::new(settings.timeout(), &settings.user_agent)
}
