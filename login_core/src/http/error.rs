use reqwest::StatusCode;
use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while signing in over HTTP. The `Display` text of
/// these ends up in front of the user, so keep it readable.
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't parse a URL, for example if the server address was invalid.
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// We couldn't complete the request, for example because the network is
    /// down or the response wasn't the JSON we expected.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server had a problem on its end (5xx.)
    #[error("The server had a problem ({0})")]
    Server(StatusCode),

    /// The server returned something we don't know how to handle (the server
    /// is not supposed to issue redirects or informational responses.)
    #[error("Unexpected response from the server ({0})")]
    Unexpected(StatusCode),
}
