// Group-membership orchestration: find devices for a user, attach a
// device to a user's group, detach and clean up.
//
// Every operation is a sequence of filtered reads and conditional writes
// against the device, group, and link tables. The steps are not
// transactional -- a failure partway through can leave a dangling group
// or link for the next call to observe.

use tracing::debug;

use crate::client::DataClient;
use crate::error::Error;
use crate::filter;
use crate::models::{Device, DeviceGroup, RecordId, UserDeviceGroup};
use crate::registry::Registry;

/// Outcome of a device removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The device was the group's sole member: group and user link deleted.
    GroupDeleted,
    /// The device was removed from a group that retains other members.
    TrimmedFromGroup,
    /// The MAC was not in any group; nothing was touched.
    NotGrouped,
}

/// Orchestrates device-to-user group membership.
///
/// Holds the three table names and an optional session user id used when
/// an operation is called without an explicit `user_id`.
pub struct DeviceManager {
    client: DataClient,
    device_resource: String,
    group_resource: String,
    link_resource: String,
    session_user: Option<i64>,
}

impl DeviceManager {
    pub fn new(
        client: DataClient,
        device_resource: impl Into<String>,
        group_resource: impl Into<String>,
        link_resource: impl Into<String>,
    ) -> Self {
        Self {
            client,
            device_resource: device_resource.into(),
            group_resource: group_resource.into(),
            link_resource: link_resource.into(),
            session_user: None,
        }
    }

    /// Set the user id to fall back to when operations omit one.
    pub fn with_session_user(mut self, user_id: i64) -> Self {
        self.session_user = Some(user_id);
        self
    }

    fn resolve_user(&self, user_id: Option<i64>) -> Result<i64, Error> {
        user_id
            .or(self.session_user)
            .ok_or_else(|| Error::BadRequest {
                message: "no user id supplied and no session user configured".into(),
            })
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch all device records in the user's group.
    ///
    /// Fails `NotFound` if the user has no group, the group is empty, or
    /// no device records match the group's member MACs.
    pub async fn devices_for_user(&self, user_id: Option<i64>) -> Result<Vec<Device>, Error> {
        let user = self.resolve_user(user_id)?;

        let group_id = self
            .group_id_for_user(user)
            .await?
            .ok_or_else(|| Error::NotFound {
                message: format!("no device group found for user {user}"),
            })?;

        let macs = self.group_members(&group_id).await?;
        if !macs.is_empty() {
            let devices: Vec<Device> = self
                .client
                .get_records(
                    &self.device_resource,
                    &filter::mac_in(macs.iter().map(String::as_str)),
                )
                .await?;

            if !devices.is_empty() {
                return Ok(devices);
            }
        }

        Err(Error::NotFound {
            message: "no device(s) found under the user account".into(),
        })
    }

    /// Attach a registered device to the user's group.
    ///
    /// The device must already be registered. A user without a group gets
    /// one: an existing group holding the MAC is reused only when it is
    /// linked to the same user, otherwise a fresh group is created; the
    /// user link is written afterwards. A user with a group gets the MAC
    /// appended, unless it is already a member (`BadRequest`).
    pub async fn add_device(&self, mac: &str, user_id: Option<i64>) -> Result<(), Error> {
        let registry = Registry::new(self.client.clone(), self.device_resource.clone());
        if registry.device_exists(mac).await?.is_none() {
            return Err(Error::NotFound {
                message: format!("no device is registered with mac {mac}"),
            });
        }

        let user = self.resolve_user(user_id)?;

        match self.group_id_for_user(user).await? {
            None => {
                let group_id = match self.group_by_mac(mac).await? {
                    Some(group) => match self.user_for_group(&group.id).await? {
                        // Reuse only a group already owned by this user.
                        Some(owner) if owner == user => group.id,
                        _ => self.create_group(mac).await?,
                    },
                    None => self.create_group(mac).await?,
                };

                self.link_user(user, &group_id).await?;
                debug!(mac, user, group_id, "device attached to new user group");
                Ok(())
            }
            Some(group_id) => {
                let mut members = self.group_members(&group_id).await?;
                if members.is_empty() {
                    return Err(Error::Internal {
                        message: "no device(s) found under existing group id".into(),
                    });
                }
                if members.iter().any(|m| m == mac) {
                    return Err(Error::BadRequest {
                        message: "device already exists under the user group".into(),
                    });
                }

                members.push(mac.to_owned());
                self.set_group_members(&group_id, &members).await?;
                debug!(mac, user, group_id, "device appended to user group");
                Ok(())
            }
        }
    }

    /// Detach a device and delete its record.
    ///
    /// A sole-member group is deleted along with its user link; otherwise
    /// the group's member set is rewritten without the MAC. The device
    /// record is deleted in either case. A MAC in no group is a no-op.
    pub async fn remove_device(&self, mac: &str) -> Result<Removal, Error> {
        let Some(group) = self.group_by_mac(mac).await? else {
            return Ok(Removal::NotGrouped);
        };

        let removal = if group.mac.len() == 1 {
            self.client
                .delete(&format!("{}/{}", self.group_resource, group.id))
                .await?;
            self.client
                .delete_filtered(&self.link_resource, &filter::group_eq(&group.id))
                .await?;
            debug!(mac, group_id = group.id, "sole member removed, group deleted");
            Removal::GroupDeleted
        } else {
            let members: Vec<String> = group
                .mac
                .iter()
                .filter(|m| m.as_str() != mac)
                .cloned()
                .collect();
            self.set_group_members(&group.id, &members).await?;
            debug!(mac, group_id = group.id, "member removed, group retained");
            Removal::TrimmedFromGroup
        };

        self.client
            .delete_filtered(&self.device_resource, &filter::mac_eq(mac))
            .await?;

        Ok(removal)
    }

    // ── Table lookups ────────────────────────────────────────────────

    /// First link row for the user, if any (one active link per user).
    async fn group_id_for_user(&self, user: i64) -> Result<Option<String>, Error> {
        let links: Vec<UserDeviceGroup> = self
            .client
            .get_records(&self.link_resource, &filter::user_eq(user))
            .await?;
        Ok(links.into_iter().next().map(|l| l.group_id))
    }

    /// The user linked to a group, if any.
    async fn user_for_group(&self, group_id: &str) -> Result<Option<i64>, Error> {
        let links: Vec<UserDeviceGroup> = self
            .client
            .get_records(&self.link_resource, &filter::group_eq(group_id))
            .await?;
        Ok(links.into_iter().next().map(|l| l.user_id))
    }

    /// The group containing a MAC, if any.
    async fn group_by_mac(&self, mac: &str) -> Result<Option<DeviceGroup>, Error> {
        let groups: Vec<DeviceGroup> = self
            .client
            .get_records(&self.group_resource, &filter::mac_in([mac]))
            .await?;
        Ok(groups.into_iter().next())
    }

    /// Member MACs of a group; a vanished group reads as empty.
    async fn group_members(&self, group_id: &str) -> Result<Vec<String>, Error> {
        match self
            .client
            .get_one::<DeviceGroup>(&format!("{}/{group_id}", self.group_resource))
            .await
        {
            Ok(group) => Ok(group.mac),
            Err(Error::Api { status: 404, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // ── Table writes ─────────────────────────────────────────────────

    /// Create a group seeded with one member, returning its id.
    async fn create_group(&self, mac: &str) -> Result<String, Error> {
        #[derive(serde::Serialize)]
        struct NewGroup<'a> {
            mac: [&'a str; 1],
        }

        let created: Vec<RecordId> = self
            .client
            .post_records(&self.group_resource, &[NewGroup { mac: [mac] }])
            .await?;

        created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| Error::Internal {
                message: format!("failed to create device group with mac {mac}"),
            })
    }

    /// Link a user to a group, returning the link id.
    async fn link_user(&self, user: i64, group_id: &str) -> Result<String, Error> {
        #[derive(serde::Serialize)]
        struct NewLink<'a> {
            user_id: i64,
            group_id: &'a str,
        }

        let created: Vec<RecordId> = self
            .client
            .post_records(
                &self.link_resource,
                &[NewLink {
                    user_id: user,
                    group_id,
                }],
            )
            .await?;

        created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| Error::Internal {
                message: format!(
                    "failed to create user device group for user id {user} and group id {group_id}"
                ),
            })
    }

    /// Rewrite a group's member set.
    async fn set_group_members(&self, group_id: &str, members: &[String]) -> Result<(), Error> {
        #[derive(serde::Serialize)]
        struct Members<'a> {
            mac: &'a [String],
        }

        let _: serde_json::Value = self
            .client
            .patch(
                &format!("{}/{group_id}", self.group_resource),
                &Members { mac: members },
            )
            .await?;
        Ok(())
    }
}
