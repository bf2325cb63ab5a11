use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failures at the edges of the simulation: config files and the score table.
/// The tick itself never fails.
#[derive(Debug)]
pub enum GameError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, message: String },
    InvalidConfig(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on {}: {source}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "could not parse {}: {message}", path.display())
            }
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
