use std::fs;
use std::io;
use std::path::PathBuf;

const STRIPPED: &[char] = &['/', '\\', ':', '-', '.', '=', '?'];

/// Directory receiving a dump per failed source.
#[derive(Debug, Clone)]
pub struct Quarantine {
    dir: PathBuf,
}

impl Quarantine {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Quarantine { dir: dir.into() }
    }

    /// Path of the dump file for a source called `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", clean_name(name)))
    }

    /// Write the error and whatever payload was received, replacing an
    /// earlier dump for the same source.
    pub fn dump(&self, name: &str, error: &str, payload: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let mut body = format!("---{}---\nResponse:\n", error).into_bytes();
        if payload.is_empty() {
            body.extend_from_slice(b"no data");
        } else {
            body.extend_from_slice(payload);
        }
        let path = self.path_for(name);
        fs::write(&path, body)?;
        Ok(path)
    }
}

pub fn clean_name(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !STRIPPED.contains(c)).collect();
    if cleaned.trim().is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_lose_path_characters() {
        assert_eq!(clean_name("a/b\\c:d-e.f=g?h"), "abcdefgh");
        assert_eq!(clean_name("../.."), "unnamed");
        assert_eq!(clean_name("My Show"), "My Show");
    }

    #[test]
    fn dump_with_and_without_payload() {
        let tmp = tempdir().unwrap();
        let q = Quarantine::new(tmp.path().join("dump"));

        let p = q.dump("news.example", "boom", b"").unwrap();
        assert_eq!(p, tmp.path().join("dump").join("newsexample.txt"));
        assert_eq!(
            fs::read_to_string(&p).unwrap(),
            "---boom---\nResponse:\nno data"
        );

        let p = q.dump("news.example", "bad xml", b"<rss>").unwrap();
        assert_eq!(
            fs::read_to_string(&p).unwrap(),
            "---bad xml---\nResponse:\n<rss>"
        );
    }
}
