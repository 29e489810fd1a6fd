//! Command dispatch: bridges CLI args -> API operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod register;

use devlink_api::{DataClient, DeviceManager, Registry};
use devlink_config::{ResourceNames, ServiceConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Resolved service context handed to every service-bound command.
pub struct Context {
    pub client: DataClient,
    pub resources: ResourceNames,
    pub user_id: Option<i64>,
}

impl Context {
    /// Build a context from a resolved service config.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, CliError> {
        let client = DataClient::new(
            cfg.url.as_str(),
            &cfg.service,
            cfg.api_key.clone(),
            &cfg.transport,
        )?;
        Ok(Self {
            client,
            resources: cfg.resources.clone(),
            user_id: cfg.user_id,
        })
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.client.clone(), self.resources.device.clone())
    }

    pub fn manager(&self) -> DeviceManager {
        let manager = DeviceManager::new(
            self.client.clone(),
            self.resources.device.clone(),
            self.resources.group.clone(),
            self.resources.link.clone(),
        );
        match self.user_id {
            Some(user) => manager.with_session_user(user),
            None => manager,
        }
    }
}

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Register(args) => register::handle(ctx, args, global).await,
        Command::Devices(args) => devices::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
