//! Device command handlers.

use serde_json::Value;
use tabled::Tabled;

use devlink_api::Removal;
use devlink_api::models::Device;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            mac: d.mac.clone(),
            name: d
                .extra
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { user } => {
            let devices = ctx.manager().devices_for_user(user).await?;
            let out = output::render_list(&global.output, &devices, |d| DeviceRow::from(d), |d| {
                d.mac.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add { mac, user } => {
            ctx.manager().add_device(&mac, user).await?;
            output::print_output(&format!("Device {mac} added to user group"), global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { mac } => {
            let removal = ctx.manager().remove_device(&mac).await?;
            let message = match removal {
                Removal::GroupDeleted => {
                    format!("Device {mac} removed; its group and user link were deleted")
                }
                Removal::TrimmedFromGroup => format!("Device {mac} removed from its group"),
                Removal::NotGrouped => format!("Device {mac} is not in any group; nothing removed"),
            };
            output::print_output(&message, global.quiet);
            Ok(())
        }
    }
}
