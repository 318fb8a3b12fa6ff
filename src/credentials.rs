// Import necessary crates and modules
use crate::error::{CanvasError, CanvasResult};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Path segment of the Canvas REST API under the instance root.
const API_PATH: &str = "/api/v1";

/// Structure to hold Canvas API credentials.
///
/// This struct stores the base URL of the Canvas REST API and the API token used as a
/// bearer token on every request.
///
/// Fields:
/// - `url_canvas`: Base URL for the Canvas API, always ending in `/api/v1`.
/// - `token_canvas`: API token for authentication.
///
/// Example usage:
/// ```ignore
/// let canvas_credentials = CanvasCredentials::new("https://canvas.example.com", "your_api_token");
/// assert_eq!(canvas_credentials.url_canvas, "https://canvas.example.com/api/v1");
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CanvasCredentials {
    pub url_canvas: String,
    pub token_canvas: String,
}

impl CanvasCredentials {
    /// Builds credentials from an instance URL and an API key.
    ///
    /// The URL may be given either as the instance root (`https://host`) or as the API
    /// root (`https://host/api/v1`); trailing slashes are ignored.
    pub fn new(url: &str, token: &str) -> CanvasCredentials {
        CanvasCredentials {
            url_canvas: normalize_api_url(url),
            token_canvas: token.to_string(),
        }
    }

    /// Loads the Canvas credentials from the `CANVAS_URL` and `CANVAS_TOKEN` environment
    /// variables. Only available with the `use_env_credentials` feature.
    pub fn load_credentials_from_env() -> CanvasResult<CanvasCredentials> {
        if !cfg!(feature = "use_env_credentials") {
            return Err(CanvasError::Credentials("Feature not enabled".to_string()));
        }

        let url = std::env::var("CANVAS_URL").map_err(|_| {
            CanvasError::Credentials("Error retrieving URL from environment".to_string())
        })?;
        let token = std::env::var("CANVAS_TOKEN").map_err(|_| {
            CanvasError::Credentials("Error retrieving token from environment".to_string())
        })?;
        log::debug!("Credentials loaded from environment for {}", url);
        Ok(CanvasCredentials::new(&url, &token))
    }

    /// Loads Canvas credentials from the system's keyring.
    ///
    /// Both entries are stored under the crate name as service, with the users
    /// `URL_CANVAS` and `TOKEN_CANVAS`. The keyring is only read, never written.
    ///
    /// Returns:
    /// - `Ok(CanvasCredentials)`: Credentials if successfully retrieved.
    /// - `Err(CanvasError::Credentials)`: If the keyring is unavailable or an entry is missing.
    pub fn load_credentials_from_system() -> CanvasResult<CanvasCredentials> {
        let app_name = env!("CARGO_PKG_NAME");
        let read = |user: &str, what: &str| {
            Entry::new(app_name, user)
                .and_then(|entry| entry.get_password())
                .map_err(|e| {
                    CanvasError::Credentials(format!("Error retrieving {} from system: {}", what, e))
                })
        };
        let url = read("URL_CANVAS", "URL")?;
        let token = read("TOKEN_CANVAS", "token")?;
        Ok(CanvasCredentials::new(&url, &token))
    }

    /// Loads the Canvas credentials, attempting first from environment variables, then from
    /// the system's keyring.
    pub fn load() -> CanvasResult<CanvasCredentials> {
        match Self::load_credentials_from_env() {
            Ok(credentials) => Ok(credentials),
            Err(env_err) => {
                log::debug!("{}; trying the system keyring", env_err);
                Self::load_credentials_from_system()
            }
        }
    }

    /// Joins an API path (`/courses/1/users`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url_canvas, path)
    }
}

fn normalize_api_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PATH)
    }
}
