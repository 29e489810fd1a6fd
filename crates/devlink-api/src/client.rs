// Data-service HTTP client.
//
// Wraps `reqwest::Client` with table-scoped URL construction, the
// `{"resource": [...]}` envelope convention, filter/api_key query
// plumbing, and error mapping. The registry and device-manager modules
// are built on these verb helpers so this module stays focused on
// transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ResourceSet;
use crate::transport::TransportConfig;

// ── Error response shape from the data service ───────────────────────

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for a table-backed data service.
///
/// All requests target `{base}/api/v2/{service}/_table/{resource}` and
/// carry the API key as a query parameter. List responses are unwrapped
/// from the resource envelope before the caller sees them.
#[derive(Clone)]
pub struct DataClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl DataClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a service root URL, service name, API key, and transport
    /// config.
    pub fn new(
        base_url: &str,
        service: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url, service)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport).
    pub fn from_reqwest(
        base_url: &str,
        service: &str,
        api_key: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url, service)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Build the table root: `{base}/api/v2/{service}/_table/`.
    fn normalize_base_url(raw: &str, service: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/api/v2/{service}/_table/"));
        Ok(url)
    }

    /// Join a resource path (e.g. `"device"` or `"device_group/{id}"`)
    /// onto the table root.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/_table/`, so joining works.
        self.base_url
            .join(path)
            .expect("path should be a valid relative URL")
    }

    fn key_param(&self) -> [(&'static str, &str); 1] {
        [("api_key", self.api_key.expose_secret())]
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// GET records matching a filter, unwrapping the resource envelope.
    pub(crate) async fn get_records<T: DeserializeOwned>(
        &self,
        resource: &str,
        filter: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(resource);
        debug!("GET {url} filter={filter}");

        let resp = self
            .http
            .get(url)
            .query(&[("filter", filter)])
            .query(&self.key_param())
            .send()
            .await?;

        let set: ResourceSet<T> = Self::handle_response(resp).await?;
        Ok(set.resource)
    }

    /// GET a single record by path (`{resource}/{id}`), returned bare.
    pub(crate) async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).query(&self.key_param()).send().await?;
        Self::handle_response(resp).await
    }

    /// POST records wrapped in the resource envelope, unwrapping the reply.
    pub(crate) async fn post_records<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        resource: &str,
        records: &[B],
    ) -> Result<Vec<T>, Error> {
        #[derive(Serialize)]
        struct Wrapped<'a, B> {
            resource: &'a [B],
        }

        let url = self.url(resource);
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .query(&self.key_param())
            .json(&Wrapped { resource: records })
            .send()
            .await?;

        let set: ResourceSet<T> = Self::handle_response(resp).await?;
        Ok(set.resource)
    }

    /// PATCH a record by path with a bare JSON body.
    pub(crate) async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .query(&self.key_param())
            .json(body)
            .send()
            .await?;

        Self::handle_response(resp).await
    }

    /// DELETE a record by path (`{resource}/{id}`).
    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).query(&self.key_param()).send().await?;
        Self::handle_empty(resp).await
    }

    /// DELETE all records matching a filter.
    pub(crate) async fn delete_filtered(&self, resource: &str, filter: &str) -> Result<(), Error> {
        let url = self.url(resource);
        debug!("DELETE {url} filter={filter}");

        let resp = self
            .http
            .delete(url)
            .query(&[("filter", filter)])
            .query(&self.key_param())
            .send()
            .await?;

        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .ok()
            .and_then(|env| env.error)
            .and_then(|err| err.message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_table_root() {
        let url = DataClient::normalize_base_url("https://host:8443", "db").unwrap();
        assert_eq!(url.as_str(), "https://host:8443/api/v2/db/_table/");
    }

    #[test]
    fn normalize_tolerates_trailing_slash() {
        let url = DataClient::normalize_base_url("https://host/", "mongo").unwrap();
        assert_eq!(url.as_str(), "https://host/api/v2/mongo/_table/");
    }
}
