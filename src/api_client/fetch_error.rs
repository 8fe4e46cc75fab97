use reqwest::Error as ReqwestError;
use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    RequestError(ReqwestError),
    StatusError { code: u16, url: String },
    JsonParseError(serde_json::Error),
    Other(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::RequestError(e) => write!(f, "Request error: {}", e),
            FetchError::StatusError { code, url } => {
                write!(f, "Unexpected status ({}) from {}", code, url)
            }
            FetchError::JsonParseError(e) => write!(f, "JSON parse error: {}", e),
            FetchError::Other(s) => write!(f, "Other error: {}", s),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ReqwestError> for FetchError {
    fn from(error: ReqwestError) -> Self {
        FetchError::RequestError(error)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::JsonParseError(error)
    }
}
