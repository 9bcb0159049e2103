use crate::date::parse_date;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Characters removed from episode file names.
const UNSAFE_FILE_CHARS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*', '?', '|', ':', '\\', '/'];

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Episode {
    pub title: String,
    /// date as it appeared in the feed
    pub date: String,
    /// `None` when `date` matched none of the known layouts
    pub published: Option<DateTime<FixedOffset>>,
    pub link: String,
    pub channel: String,
    pub description: String,
    pub author: String,
}

impl Episode {
    pub fn new(
        title: &str,
        date: &str,
        link: &str,
        channel: &str,
        description: &str,
        author: &str,
    ) -> Self {
        Episode {
            title: title.to_string(),
            date: date.to_string(),
            published: parse_date(date).ok(),
            link: sanitize_link(link),
            channel: channel.to_string(),
            description: description.to_string(),
            author: author.to_string(),
        }
    }

    /// Strictly older than `cutoff`. An unparsed date is never stale.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.published
            .map_or(false, |d| d.with_timezone(&Utc) < cutoff)
    }

    /// `date-channel-title` with path-hostile characters stripped.
    pub fn safe_file_name(&self) -> String {
        let date = match self.published {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => self.date.clone(),
        };
        format!("{}-{}-{}", date, self.channel, self.title)
            .chars()
            .filter(|c| !UNSAFE_FILE_CHARS.contains(c))
            .collect()
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.published {
            Some(d) => write!(f, "{}", d.format("%d-%b-%Y %H:%M"))?,
            None => write!(f, "{}", self.date)?,
        }
        write!(f, ". {}: {}", self.channel, self.title)
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Podcast {
    pub title: String,
    pub description: String,
    pub link: String,
    pub episodes: Vec<Episode>,
}

impl Podcast {
    pub fn latest(&self, n: usize) -> &[Episode] {
        &self.episodes[..n.min(self.episodes.len())]
    }
}

impl fmt::Display for Podcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {} episode(s).", self.title, self.episodes.len())
    }
}

/// Drop everything from the first `?` on.
pub fn sanitize_link(link: &str) -> String {
    match link.find('?') {
        Some(idx) => link[..idx].to_string(),
        None => link.to_string(),
    }
}

/// Newest first; episodes without a parsed date sort after all dated ones.
pub fn newest_first(a: &Episode, b: &Episode) -> Ordering {
    match (a.published, b.published) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Every episode of every podcast, newest first.
pub fn merge_episodes(podcasts: &[Podcast]) -> Vec<&Episode> {
    let mut all: Vec<&Episode> = podcasts.iter().flat_map(|p| p.episodes.iter()).collect();
    all.sort_by(|a, b| newest_first(a, b));
    all
}
