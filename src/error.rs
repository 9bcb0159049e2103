use thiserror::Error;

/// Why a single source could not be turned into a podcast.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("no data received")]
    EmptyPayload,

    #[error("malformed feed document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document ended inside <{0}>")]
    Truncated(String),

    #[error("missing element <{0}>")]
    MissingElement(&'static str),

    #[error("missing attribute {attribute} on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("empty date")]
    Empty,

    #[error("cannot parse date: {0}")]
    Unparseable(String),
}
