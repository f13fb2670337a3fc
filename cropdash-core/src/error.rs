use thiserror::Error;

/// Failure of a call to the dashboard backend.
///
/// The variants keep "the server rejected this" apart from "the network is
/// unavailable": only [`ApiError::Network`] is eligible for fallback data.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a structured error, either through a
    /// non-success status or an `error` field in an otherwise successful body.
    #[error("{}", api_message(*status, body))]
    Api { status: u16, body: serde_json::Value },

    /// No usable response: the request failed in transit, or a successful
    /// status came back with a body that is not the expected JSON.
    #[error("Network unavailable: {0}")]
    Network(#[from] NetworkFailure),

    /// The response parsed but lacks fields the dashboard needs.
    #[error("Invalid {kind} data received")]
    Validation { kind: &'static str },

    /// The CSV export endpoint refused the request.
    #[error("Export failed with status {status}")]
    Export { status: u16 },

    /// The exported file could not be handed to the download sink.
    #[error("Failed to save download: {0}")]
    Download(#[from] std::io::Error),
}

/// Why a request produced no usable response.
#[derive(Debug, Error)]
pub enum NetworkFailure {
    /// DNS, connection, timeout or an interrupted body.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A success status whose body did not decode, as served by captive
    /// portals and misbehaving proxies.
    #[error("unreadable {what} response: {source}")]
    Body {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(NetworkFailure::Transport(e))
    }
}

impl ApiError {
    pub(crate) fn unreadable(what: &'static str, source: serde_json::Error) -> Self {
        ApiError::Network(NetworkFailure::Body { what, source })
    }


    /// True when the backend could not be reached at all.
    pub fn is_offline(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// HTTP status of a backend rejection; network failures carry none.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } | ApiError::Export { status } => Some(*status),
            _ => None,
        }
    }
}

fn api_message(status: u16, body: &serde_json::Value) -> String {
    match body.get("error").and_then(|e| e.as_str()) {
        Some(message) => message.to_string(),
        None => format!("Request failed with status {status}"),
    }
}
