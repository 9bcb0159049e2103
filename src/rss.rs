use crate::{
    entity::{Episode, Podcast},
    error::IngestError,
    model::Node,
    parser::parse_document,
    report::Reporter,
    util::filter_time,
};
use chrono::{DateTime, Utc};

/// How the recency cutoff is applied to a channel's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffStrategy {
    /// Assume newest-first items and stop at the first stale one.
    StopAtFirstStale,
    /// Look at every item and drop the stale ones.
    FilterAll,
}

impl Default for CutoffStrategy {
    fn default() -> Self {
        CutoffStrategy::StopAtFirstStale
    }
}

/// Turn an RSS document into a `Podcast`, keeping only episodes not older
/// than `cutoff`.
pub fn read_podcast(
    xml: &[u8],
    cutoff: DateTime<Utc>,
    strategy: CutoffStrategy,
    reporter: &dyn Reporter,
) -> Result<Podcast, IngestError> {
    let root = parse_document(xml)?;
    let channel = root
        .child("channel")
        .ok_or(IngestError::MissingElement("channel"))?;
    let title = required_text(channel, "title")?;
    let description = required_text(channel, "description")?;
    let link = required_text(channel, "link")?;

    let fresh = filter_time(cutoff);
    let mut episodes = Vec::new();
    for item in channel.children_named("item") {
        let episode = read_episode(item, title)?;
        if episode.published.is_none() {
            reporter.warn(&format!(
                "Cannot parse date '{}' of '{}'.",
                episode.date, episode.title
            ));
        }
        if !fresh(&episode) {
            match strategy {
                CutoffStrategy::StopAtFirstStale => break,
                CutoffStrategy::FilterAll => continue,
            }
        }
        episodes.push(episode);
    }

    Ok(Podcast {
        title: title.to_string(),
        description: description.to_string(),
        link: link.to_string(),
        episodes,
    })
}

fn read_episode(item: &Node, channel: &str) -> Result<Episode, IngestError> {
    let title = required_text(item, "title")?;
    let date = required_text(item, "pubDate")?;
    let url = item
        .child("enclosure")
        .ok_or(IngestError::MissingElement("enclosure"))?
        .attr("url")
        .ok_or(IngestError::MissingAttribute {
            element: "enclosure",
            attribute: "url",
        })?;
    Ok(Episode::new(
        title,
        date,
        url,
        channel,
        item.child_text_or("description", ""),
        item.child_text_or("author", ""),
    ))
}

fn required_text<'a>(node: &'a Node, name: &'static str) -> Result<&'a str, IngestError> {
    node.child(name)
        .map(|c| c.text.as_str())
        .ok_or(IngestError::MissingElement(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use chrono::Duration;

    fn item(title: &str, date: &str) -> String {
        format!(
            "<item><title>{}</title><pubDate>{}</pubDate>\
             <enclosure url=\"http://cdn.test/{}.mp3?src=rss\" type=\"audio/mpeg\"/>\
             <description>about {}</description></item>",
            title, date, title, title
        )
    }

    fn feed(items: &[String]) -> Vec<u8> {
        format!(
            "<rss version=\"2.0\"><channel><title>Daily</title>\
             <description>news</description><link>http://daily.test</link>{}\
             </channel></rss>",
            items.concat()
        )
        .into_bytes()
    }

    fn days_ago(now: DateTime<Utc>, d: i64) -> String {
        (now - Duration::days(d)).to_rfc2822()
    }

    #[test]
    fn cutoff_keeps_recent_items() {
        let now = Utc::now();
        let xml = feed(&[
            item("a", &days_ago(now, 10)),
            item("b", &days_ago(now, 20)),
            item("c", &days_ago(now, 40)),
        ]);
        let rp = MemoryReporter::new();
        let p = read_podcast(
            &xml,
            now - Duration::days(30),
            CutoffStrategy::StopAtFirstStale,
            &rp,
        )
        .expect("read failed");
        assert_eq!(p.title, "Daily");
        assert_eq!(p.link, "http://daily.test");
        let titles: Vec<&str> = p.episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(p.episodes[0].channel, "Daily");
        assert_eq!(p.episodes[0].link, "http://cdn.test/a.mp3");
        assert_eq!(p.episodes[0].description, "about a");
        assert_eq!(p.episodes[0].author, "");
    }

    #[test]
    fn boundary_episode_is_kept() {
        let now = DateTime::parse_from_rfc3339("2025-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let cutoff = now - Duration::days(30);
        let xml = feed(&[
            item("edge", &cutoff.to_rfc2822()),
            item("older", &(cutoff - Duration::seconds(1)).to_rfc2822()),
        ]);
        let p = read_podcast(&xml, cutoff, CutoffStrategy::StopAtFirstStale, &MemoryReporter::new())
            .unwrap();
        assert_eq!(p.episodes.len(), 1);
        assert_eq!(p.episodes[0].title, "edge");
    }

    #[test]
    fn early_exit_drops_out_of_order_items() {
        let now = Utc::now();
        let xml = feed(&[
            item("new", &days_ago(now, 1)),
            item("old", &days_ago(now, 50)),
            item("late", &days_ago(now, 2)),
        ]);
        let cutoff = now - Duration::days(30);
        let early = read_podcast(&xml, cutoff, CutoffStrategy::StopAtFirstStale, &MemoryReporter::new())
            .unwrap();
        assert_eq!(early.episodes.len(), 1);

        let full = read_podcast(&xml, cutoff, CutoffStrategy::FilterAll, &MemoryReporter::new())
            .unwrap();
        let titles: Vec<&str> = full.episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "late"]);
    }

    #[test]
    fn unparsed_date_is_retained_and_reported() {
        let now = Utc::now();
        let xml = feed(&[item("odd", "yesterday-ish"), item("a", &days_ago(now, 1))]);
        let rp = MemoryReporter::new();
        let p = read_podcast(&xml, now - Duration::days(30), CutoffStrategy::StopAtFirstStale, &rp)
            .unwrap();
        assert_eq!(p.episodes.len(), 2);
        assert!(p.episodes[0].published.is_none());
        assert_eq!(rp.count(log::Level::Warn), 1);
        assert!(rp.contains("yesterday-ish"));
    }

    #[test]
    fn optional_author_is_read() {
        let xml = feed(&[
            "<item><title>t</title><pubDate>x</pubDate><author>Ann</author>\
             <enclosure url=\"u\"/></item>"
                .to_string(),
        ]);
        let p = read_podcast(&xml, Utc::now(), CutoffStrategy::FilterAll, &MemoryReporter::new())
            .unwrap();
        assert_eq!(p.episodes[0].author, "Ann");
        assert_eq!(p.episodes[0].description, "");
    }

    #[test]
    fn missing_required_parts_fail() {
        let rp = MemoryReporter::new();
        let cutoff = Utc::now();
        let strategy = CutoffStrategy::StopAtFirstStale;

        let no_channel = b"<rss></rss>";
        assert!(matches!(
            read_podcast(no_channel, cutoff, strategy, &rp),
            Err(IngestError::MissingElement("channel"))
        ));

        let no_link = b"<rss><channel><title>t</title><description/></channel></rss>";
        assert!(matches!(
            read_podcast(no_link, cutoff, strategy, &rp),
            Err(IngestError::MissingElement("link"))
        ));

        let no_enclosure = feed(&["<item><title>t</title><pubDate>x</pubDate></item>".to_string()]);
        assert!(matches!(
            read_podcast(&no_enclosure, cutoff, strategy, &rp),
            Err(IngestError::MissingElement("enclosure"))
        ));

        let no_url = feed(&[
            "<item><title>t</title><pubDate>x</pubDate><enclosure/></item>".to_string(),
        ]);
        assert!(matches!(
            read_podcast(&no_url, cutoff, strategy, &rp),
            Err(IngestError::MissingAttribute { .. })
        ));
    }
}
