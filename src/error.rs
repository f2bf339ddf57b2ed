use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: [{section}] {key}: {reason}")]
    Config {
        section: String,
        key: String,
        reason: String,
    },

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("malformed entry [{section}] {key}: {reason}")]
    MalformedEntry {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cell ({rx}, {ry}) is outside the {width}x{height} map")]
    OutOfBounds {
        rx: i32,
        ry: i32,
        width: u32,
        height: u32,
    },

    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    pub fn config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::Config {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(section: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Decoded length disagrees with what the caller expected
    pub fn size_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        Self::CorruptStream(format!("{what}: expected {expected} bytes, got {actual}"))
    }
}

// Byte reads only run over in-memory pack data, where EOF means truncation.
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::CorruptStream("unexpected end of data".into()),
            _ => Self::Io(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
