use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Operands of an elementwise op or a dot product have incompatible shapes.
    ShapeMismatch(String),
    /// A matrix was used as a vector while having more than one row and column.
    InvalidShape(String),
    IndexOutOfRange(String),
    InvalidArgument(String),
    /// A persisted model is truncated, has a malformed header, or has the wrong length.
    CorruptModel(String),
    InvalidConfig(String),
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            Error::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Error::IndexOutOfRange(msg) => write!(f, "index out of range: {msg}"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::CorruptModel(msg) => write!(f, "corrupt model: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
