// Device registration: upsert-by-MAC against the device table.

use serde_json::Value;
use tracing::debug;

use crate::client::DataClient;
use crate::error::Error;
use crate::filter;
use crate::models::RecordId;

/// Registers devices in the backing data service, keyed by MAC.
///
/// Registration is idempotent per MAC: an unknown MAC creates a record,
/// a known MAC patches the existing one.
pub struct Registry {
    client: DataClient,
    resource: String,
}

impl Registry {
    pub fn new(client: DataClient, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into(),
        }
    }

    /// Register a device from an arbitrary attribute payload.
    ///
    /// The only shape requirement is a string `mac` field; everything else
    /// is stored as-is. Returns the created or patched record.
    pub async fn register(
        &self,
        payload: serde_json::Map<String, Value>,
    ) -> Result<Value, Error> {
        let mac = payload
            .get("mac")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::BadRequest {
                message: "register payload is missing a 'mac' field".into(),
            })?
            .to_owned();

        match self.device_exists(&mac).await? {
            None => {
                debug!(mac, "registering new device");
                let created: Vec<Value> = self
                    .client
                    .post_records(&self.resource, &[Value::Object(payload)])
                    .await?;
                created.into_iter().next().ok_or_else(|| Error::Internal {
                    message: format!("failed to create device record for mac {mac}"),
                })
            }
            Some(id) => {
                debug!(mac, id, "updating registered device");
                self.client
                    .patch(&format!("{}/{id}", self.resource), &Value::Object(payload))
                    .await
            }
        }
    }

    /// Look up a device by MAC, returning its record id if registered.
    pub async fn device_exists(&self, mac: &str) -> Result<Option<String>, Error> {
        let matches: Vec<RecordId> = self
            .client
            .get_records(&self.resource, &filter::mac_eq(mac))
            .await?;
        Ok(matches.into_iter().next().map(|r| r.id))
    }
}
