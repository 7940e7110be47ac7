use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IndexError {
    /// The embedder failed or returned the wrong number/shape of vectors.
    Embed(String),
    /// The vector store rejected a read or write.
    Store(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Embed(msg) => write!(f, "embedding failed: {msg}"),
            IndexError::Store(msg) => write!(f, "vector store error: {msg}"),
            IndexError::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
