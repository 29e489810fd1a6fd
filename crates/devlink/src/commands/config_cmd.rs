//! Config subcommand handlers.

use dialoguer::{Input, Select};

use devlink_config::{self as config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("devlink — configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Data-service URL
            let url: String = Input::new()
                .with_prompt("Data-service root URL")
                .default("https://localhost".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Service name
            let service: String = Input::new()
                .with_prompt("Database service name")
                .default("db".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 4. API key
            let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API key?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let api_key_field = if store_selection == 0 {
                let entry = keyring::Entry::new("devlink", &format!("{profile_name}/api-key"))
                    .map_err(|e| CliError::Validation {
                        field: "keyring".into(),
                        reason: format!("failed to access keyring: {e}"),
                    })?;
                entry.set_password(&key).map_err(|e| CliError::Validation {
                    field: "keyring".into(),
                    reason: format!("failed to store API key in keyring: {e}"),
                })?;
                eprintln!("   API key stored in system keyring");
                None
            } else {
                Some(key)
            };

            // 5. Default user id (optional)
            let user_raw: String = Input::new()
                .with_prompt("Default user id (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let user_id = if user_raw.trim().is_empty() {
                None
            } else {
                Some(
                    user_raw
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| CliError::Validation {
                            field: "user_id".into(),
                            reason: format!("expected an integer, got '{user_raw}'"),
                        })?,
                )
            };

            // 6. Build profile and save
            let profile = Profile {
                url,
                service,
                device_resource: "device".into(),
                group_resource: "device_group".into(),
                link_resource: "user_device_group".into(),
                api_key: api_key_field,
                api_key_env: None,
                user_id,
                ca_cert: None,
                insecure: None,
                timeout: None,
            };

            let mut cfg = config::load_config_or_default();
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }
            cfg.profiles.insert(profile_name.clone(), profile);
            config::save_config(&cfg)?;

            eprintln!("\nProfile '{profile_name}' saved to {}", config_path.display());
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            })?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
