use crate::{
    cache::TtlCache,
    client::Fetcher,
    entity::Podcast,
    error::IngestError,
    quarantine::Quarantine,
    report::Reporter,
    rss::{read_podcast, CutoffStrategy},
    source::Source,
    util::url_digest,
};
use chrono::{DateTime, Duration, Utc};

/// Fetches, caches and parses every registered source in order.
pub struct Pipeline<'a> {
    cache: &'a TtlCache<'a>,
    fetcher: &'a dyn Fetcher,
    quarantine: &'a Quarantine,
    reporter: &'a dyn Reporter,
    max_age: Duration,
    strategy: CutoffStrategy,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        cache: &'a TtlCache<'a>,
        fetcher: &'a dyn Fetcher,
        quarantine: &'a Quarantine,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Pipeline {
            cache,
            fetcher,
            quarantine,
            reporter,
            max_age: Duration::days(30),
            strategy: CutoffStrategy::default(),
        }
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn strategy(mut self, strategy: CutoffStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn run(&self, sources: &[Source]) -> Vec<Podcast> {
        self.run_at(sources, Utc::now())
    }

    pub fn run_at(&self, sources: &[Source], now: DateTime<Utc>) -> Vec<Podcast> {
        let cutoff = now - self.max_age;
        let mut podcasts = Vec::with_capacity(sources.len());

        for source in sources {
            self.reporter.info(&format!(
                "Getting eps for '{}' ({}).",
                source.name, source.url
            ));
            let outcome = match self.payload(source, now) {
                Ok(payload) => read_podcast(&payload, cutoff, self.strategy, self.reporter)
                    .map_err(|e| (e, payload)),
                Err(e) => Err((e, Vec::new())),
            };
            match outcome {
                Ok(podcast) => {
                    self.reporter.debug(&format!("{}", podcast));
                    podcasts.push(podcast);
                }
                Err((e, payload)) => self.isolate(source, &e, &payload),
            }
        }
        podcasts
    }

    fn payload(&self, source: &Source, now: DateTime<Utc>) -> Result<Vec<u8>, IngestError> {
        let key = url_digest(&source.url);
        if let Ok(Some(entry)) = self.cache.read_at(&key, now) {
            self.reporter
                .info(&format!("Got episode data from cachefile '{}'.", key));
            return Ok(entry.payload);
        }

        let body = self.fetcher.fetch(&source.url)?;
        if body.is_empty() {
            self.reporter
                .warn(&format!("No data obtained for '{}'.", source.url));
        } else if self.cache.write(&key, &body, Some(now)).is_ok() {
            self.reporter
                .info(&format!("Cached episode data in '{}'.", key));
        }
        Ok(body)
    }

    fn isolate(&self, source: &Source, error: &IngestError, payload: &[u8]) {
        let target = self.quarantine.path_for(&source.name);
        self.reporter.error(&format!(
            "Error obtaining episodes for {}: '{}' ({}). Dumping contents to '{}'.",
            source.name,
            source.url,
            error,
            target.display()
        ));
        if let Err(e) = self.quarantine.dump(&source.name, &error.to_string(), payload) {
            self.reporter.error(&format!(
                "Could not write quarantine file for {}: {}",
                source.name, e
            ));
        }
    }
}
