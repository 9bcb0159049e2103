use crate::report::Reporter;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub const FEEDS_HEADER: &str = "# Enter your podcasts here in name;url format\n";

/// One line of the feeds file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: &str, url: &str) -> Self {
        Source {
            name: name.trim().to_string(),
            url: url.trim().to_string(),
        }
    }
}

/// Parse `name;url` lines. Comment lines, lines shorter than two characters
/// and lines without a separator are skipped.
pub fn parse_sources(text: &str, reporter: &dyn Reporter) -> Vec<Source> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with('#') && line.chars().count() > 1)
        .filter_map(|(idx, line)| {
            let mut fields = line.split(';');
            match (fields.next(), fields.next()) {
                (Some(name), Some(url)) => Some(Source::new(name, url)),
                _ => {
                    reporter.warn(&format!(
                        "Ignoring feeds line {}: expected 'name;url', got '{}'.",
                        idx + 1,
                        line.trim()
                    ));
                    None
                }
            }
        })
        .collect()
}

pub fn read_sources(path: &Path, reporter: &dyn Reporter) -> io::Result<Vec<Source>> {
    let text = fs::read_to_string(path)?;
    let sources = parse_sources(&text, reporter);
    if sources.is_empty() {
        reporter.warn(&format!("No podcasts in feeds file {}.", path.display()));
    }
    Ok(sources)
}

/// Append one source; existing lines are never rewritten.
pub fn append_source(path: &Path, source: &Source) -> io::Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{};{}", source.name, source.url)
}

/// Create the feeds file with a comment header. Returns `false` if it
/// already existed.
pub fn init_sources_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, FEEDS_HEADER)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use tempfile::tempdir;

    #[test]
    fn parse_skips_comments_and_short_lines() {
        let text = "# my feeds\n\
                    \n\
                    x\n\
                    Daily ; https://daily.test/rss \n\
                    #Old;http://old.test\n\
                    Weekly;http://weekly.test/feed?format=rss\n";
        let rp = MemoryReporter::new();
        let sources = parse_sources(text, &rp);
        assert_eq!(
            sources,
            vec![
                Source::new("Daily", "https://daily.test/rss"),
                Source::new("Weekly", "http://weekly.test/feed?format=rss"),
            ]
        );
        assert!(rp.records().is_empty());
    }

    #[test]
    fn single_multibyte_char_line_is_skipped() {
        let rp = MemoryReporter::new();
        let sources = parse_sources("é\nA;http://a.test\n", &rp);
        assert_eq!(sources, vec![Source::new("A", "http://a.test")]);
        assert!(rp.records().is_empty());
    }

    #[test]
    fn line_without_separator_is_reported() {
        let rp = MemoryReporter::new();
        let sources = parse_sources("just a name\nA;http://a.test\n", &rp);
        assert_eq!(sources.len(), 1);
        assert!(rp.contains("line 1"));
    }

    #[test]
    fn append_then_read_preserves_order() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("feeds.txt");
        assert!(init_sources_file(&path).unwrap());
        assert!(!init_sources_file(&path).unwrap());

        let rp = MemoryReporter::new();
        assert!(read_sources(&path, &rp).unwrap().is_empty());
        assert!(rp.contains("No podcasts"));

        append_source(&path, &Source::new("A", "http://a.test")).unwrap();
        append_source(&path, &Source::new("B", "http://b.test")).unwrap();
        let sources = read_sources(&path, &rp).unwrap();
        assert_eq!(sources[0].name, "A");
        assert_eq!(sources[1].url, "http://b.test");

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(FEEDS_HEADER));
        assert!(text.ends_with("A;http://a.test\nB;http://b.test\n"));
    }
}
