use crate::error::IngestError;
use std::io::Read;
use std::time::Duration;

/// Upper bound on a feed body; a longer body fails the fetch.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

pub trait Fetcher {
    /// Raw body of `url`. Only the transport status decides success.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError>;
}

pub struct Client {
    agent: ureq::Agent,
}

impl Client {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Client { agent }
    }
}

impl Fetcher for Client {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => IngestError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(t) => IngestError::Fetch {
                url: url.to_string(),
                reason: t.to_string(),
            },
        })?;

        read_body(response.into_reader(), MAX_BODY_BYTES, url)
    }
}

fn read_body(reader: impl Read, limit: u64, url: &str) -> Result<Vec<u8>, IngestError> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    if body.len() as u64 > limit {
        return Err(IngestError::Fetch {
            url: url.to_string(),
            reason: format!("body exceeds {} bytes", limit),
        });
    }
    Ok(body)
}
