use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "Failed to read configuration: {err}"),
            Error::Parse(err) => write!(f, "Failed to parse configuration: {err}"),
            Error::Validation(err) => write!(f, "Invalid configuration: {err}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Parse(error.to_string())
    }
}
