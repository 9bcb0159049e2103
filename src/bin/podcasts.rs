use clap::Parser;
use podcast_reader::{
    get_fetcher, merge_episodes,
    quarantine::Quarantine,
    source::{append_source, init_sources_file, read_sources},
    util, CutoffStrategy, LogReporter, Pipeline, Settings, Source, TtlCache,
};
use std::error::Error;
use std::path::PathBuf;

/// List recent episodes of the podcasts in a feeds file.
#[derive(Parser, Debug)]
#[command(name = "podcasts", version)]
struct Cli {
    /// Path to the feeds file (default: ./feeds.txt)
    feeds: Option<PathBuf>,

    /// Maximum episode age in days (default: 30)
    #[arg(long, value_name = "DAYS")]
    max_age: Option<u32>,

    /// Directory for cached feed documents
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Directory for dumps of feeds that failed
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Seconds a cached feed stays fresh
    #[arg(long, value_name = "SECONDS")]
    ttl: Option<u32>,

    /// Check every item against the cutoff instead of stopping at the first old one
    #[arg(long)]
    full_scan: bool,

    /// Append a feed to the feeds file before reading
    #[arg(long, num_args = 2, value_names = ["NAME", "URL"])]
    add: Option<Vec<String>>,

    /// Empty the cache before reading
    #[arg(long)]
    clear_cache: bool,

    /// List up to N episodes under each podcast instead of one merged list
    #[arg(long, value_name = "N")]
    latest: Option<usize>,

    /// Print the podcasts as JSON
    #[arg(long)]
    json: bool,

    /// Log spec used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log: String,
}

impl Cli {
    fn settings(&self, mut settings: Settings) -> Settings {
        if let Some(feeds) = &self.feeds {
            settings.feeds_file = feeds.clone();
        }
        if let Some(days) = self.max_age {
            settings.max_age_days = days;
        }
        if let Some(dir) = &self.cache_dir {
            settings.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.dump_dir {
            settings.dump_dir = dir.clone();
        }
        if let Some(ttl) = self.ttl {
            settings.cache_ttl = ttl;
        }
        if self.full_scan {
            settings.cutoff = CutoffStrategy::FilterAll;
        }
        settings
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log = util::init_log(&cli.log)?;
    let settings = cli.settings(Settings::from_env()?);
    log::debug!("{:?}", settings);

    let reporter = LogReporter;
    if init_sources_file(&settings.feeds_file)? {
        log::info!("Created feeds file {}.", settings.feeds_file.display());
    }
    if let Some([name, url]) = cli.add.as_deref() {
        append_source(&settings.feeds_file, &Source::new(name, url))?;
        log::info!("Added '{}' to {}.", name, settings.feeds_file.display());
    }

    let cache = TtlCache::new(&settings.cache_dir, settings.cache_lifetime(), &reporter);
    if cli.clear_cache {
        cache.clear(None)?;
    }

    let sources = read_sources(&settings.feeds_file, &reporter)?;
    let fetcher = get_fetcher(&settings);
    let quarantine = Quarantine::new(&settings.dump_dir);
    let podcasts = Pipeline::new(&cache, &fetcher, &quarantine, &reporter)
        .max_age(settings.max_age())
        .strategy(settings.cutoff)
        .run(&sources);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&podcasts)?);
        return Ok(());
    }

    if let Some(n) = cli.latest {
        for p in &podcasts {
            println!("{}", p);
            for e in p.latest(n) {
                println!("    {}", e);
            }
        }
        return Ok(());
    }

    for (i, p) in podcasts.iter().enumerate() {
        println!("{}. {}", i + 1, p);
    }
    println!();
    for (i, e) in merge_episodes(&podcasts).iter().enumerate() {
        println!("{}. {}", i + 1, e);
    }
    Ok(())
}
