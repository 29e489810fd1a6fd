//! CLI-side configuration resolution: profile selection and flag overrides.
//!
//! `devlink-config` owns the TOML structures and credential chain; this
//! module layers `GlobalOpts` on top and is the single boundary where CLI
//! flags cross into a resolved `ServiceConfig`.

use std::time::Duration;

use secrecy::SecretString;

use devlink_api::{TlsMode, TransportConfig};
use devlink_config::{Config, Profile, ResourceNames, ServiceConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `ServiceConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ServiceConfig, CliError> {
    // 1. Service URL (flag > env > profile)
    let url_str = global.url.as_deref().unwrap_or(&profile.url);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. API key (flag first, then the profile's credential chain)
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => devlink_config::resolve_api_key(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    // 4. Service name (flag > env > profile)
    let service = global
        .service
        .as_deref()
        .unwrap_or(&profile.service)
        .to_owned();

    // 5. Timeout
    let timeout = Duration::from_secs(global.timeout);

    Ok(ServiceConfig {
        url,
        service,
        api_key,
        resources: ResourceNames {
            device: profile.device_resource.clone(),
            group: profile.group_resource.clone(),
            link: profile.link_resource.clone(),
        },
        transport: TransportConfig { tls, timeout },
        user_id: profile.user_id,
    })
}

/// Build a `ServiceConfig` from the config file, profile, and CLI overrides.
pub fn build_service_config(global: &GlobalOpts) -> Result<ServiceConfig, CliError> {
    let cfg = devlink_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global);
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: devlink_config::config_path().display().to_string(),
    })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let api_key = global
        .api_key
        .as_ref()
        .map(|key| SecretString::from(key.clone()))
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    Ok(ServiceConfig {
        url,
        service: global.service.clone().unwrap_or_else(|| "db".into()),
        api_key,
        resources: ResourceNames {
            device: "device".into(),
            group: "device_group".into(),
            link: "user_device_group".into(),
        },
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(global.timeout),
        },
        user_id: None,
    })
}
