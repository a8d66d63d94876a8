pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug)]
pub enum EditError {
    /// Index or line number past the valid range; nothing was modified.
    OutOfRange(u64),
    /// A line-break removal named an offset with no tracked break.
    NotFound(u64),
    IoError(std::io::Error),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::OutOfRange(index) => write!(f, "position {index} is out of range"),
            EditError::NotFound(offset) => write!(f, "no line break at offset {offset}"),
            EditError::IoError(e) => write!(f, "io failure: {e}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<std::io::Error> for EditError {
    fn from(value: std::io::Error) -> Self {
        EditError::IoError(value)
    }
}
