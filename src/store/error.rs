use std::fmt;

#[derive(Debug, PartialEq)]
pub enum Error {
    Backend(String),
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Backend(err) => write!(f, "Session store error: {err}"),
            Error::Serialization(err) => write!(f, "Session store serialization error: {err}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serialization(error.to_string())
    }
}
