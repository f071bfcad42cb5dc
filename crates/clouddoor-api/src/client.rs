// DoorCloud HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer/form header
// handling, and the strict "200 or error" response contract shared by
// all three endpoints. Single attempt per call: no retries, no session.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AccessToken, Credentials};
use crate::error::Error;
use crate::models::{
    Location, OpenDoorResponse, OpenDoorResult, TokenResponse, UserLocationsResponse,
};
use crate::transport::TransportConfig;

const CLIENT_ID: &str = "DoorCloudWebApp";
const GRANT_TYPE: &str = "password";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const TOKEN_PATH: &str = "/token";
const LOCATIONS_PATH: &str = "/api/Location/GetUserLocations";
const OPEN_DOOR_PATH: &str = "/api/Location/OpenDoorOnLocation";

/// Everything one exchange needs. Built per call, never stored.
struct ApiRequest<'a> {
    method: Method,
    path: &'static str,
    content_type: Option<&'static str>,
    body: Option<String>,
    token: Option<&'a AccessToken>,
}

/// Async client for the DoorCloud API.
///
/// Holds only the HTTP connection pool and the base URL. Tokens are
/// passed into each call and dropped by the caller afterwards.
#[derive(Debug, Clone)]
pub struct DoorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DoorClient {
    /// Build a client for `hostname` using the given transport settings.
    pub fn new(hostname: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(hostname)?;
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Exchange username/password for a bearer token.
    ///
    /// `POST /token` with a form body carrying `client_id`, `grant_type`,
    /// `username` and `password`. No `Authorization` header.
    pub async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken, Error> {
        let body = serde_urlencoded::to_string(&[
            ("client_id", CLIENT_ID),
            ("grant_type", GRANT_TYPE),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
        ])?;

        debug!(username = %credentials.username, "requesting access token");

        let resp: TokenResponse = self
            .request(ApiRequest {
                method: Method::POST,
                path: TOKEN_PATH,
                content_type: Some(FORM_CONTENT_TYPE),
                body: Some(body),
                token: None,
            })
            .await?;

        Ok(AccessToken::new(resp.access_token))
    }

    /// List every location the token's user may access.
    ///
    /// `GET /api/Location/GetUserLocations`, unwrapping `{result: [...]}`.
    pub async fn list_locations(&self, token: &AccessToken) -> Result<Vec<Location>, Error> {
        let resp: UserLocationsResponse = self
            .request(ApiRequest {
                method: Method::GET,
                path: LOCATIONS_PATH,
                content_type: None,
                body: None,
                token: Some(token),
            })
            .await?;

        debug!(count = resp.result.len(), "fetched user locations");
        Ok(resp.result)
    }

    /// Send the unlock command for an access point.
    ///
    /// `POST /api/Location/OpenDoorOnLocation` with body
    /// `accessPointId=<id>`, the id percent-encoded.
    pub async fn open_door(
        &self,
        token: &AccessToken,
        access_point_id: &str,
    ) -> Result<OpenDoorResult, Error> {
        let body = serde_urlencoded::to_string(&[("accessPointId", access_point_id)])?;

        debug!(access_point_id, "opening door");

        let resp: OpenDoorResponse = self
            .request(ApiRequest {
                method: Method::POST,
                path: OPEN_DOOR_PATH,
                content_type: None,
                body: Some(body),
                token: Some(token),
            })
            .await?;

        Ok(resp.into())
    }

    // ── Transport mechanics ──────────────────────────────────────────

    /// `{base}{path}`, tolerating a trailing slash on the base.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    async fn request<T: DeserializeOwned>(&self, req: ApiRequest<'_>) -> Result<T, Error> {
        let url = self.url(req.path)?;
        debug!("{} {}", req.method, url);

        let mut builder = self.http.request(req.method, url);
        if let Some(content_type) = req.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(token) = req.token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();

        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        trace!(len = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview = body.chars().take(200).collect::<String>();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> DoorClient {
        DoorClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).expect("valid test URL"),
        )
    }

    #[test]
    fn url_joins_paths_onto_base() {
        let c = client("https://doors.example.com");
        assert_eq!(
            c.url(TOKEN_PATH).expect("url").as_str(),
            "https://doors.example.com/token"
        );
    }

    #[test]
    fn url_tolerates_trailing_slash_and_prefix() {
        let c = client("https://doors.example.com/tenant/");
        assert_eq!(
            c.url(LOCATIONS_PATH).expect("url").as_str(),
            "https://doors.example.com/tenant/api/Location/GetUserLocations"
        );
    }

    #[test]
    fn bad_hostname_is_invalid_url() {
        let err = DoorClient::new("not a url", &TransportConfig::default())
            .expect_err("hostname should not parse");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
