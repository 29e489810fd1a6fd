//! Register command handler.

use serde_json::Value;

use crate::cli::{GlobalOpts, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Build the registration payload from `--mac` and `--attr KEY=VALUE` pairs.
///
/// Attribute values that parse as JSON are stored typed (numbers, bools,
/// nested structures); anything else is stored as a string.
fn build_payload(args: &RegisterArgs) -> Result<serde_json::Map<String, Value>, CliError> {
    let mut payload = serde_json::Map::new();
    payload.insert("mac".into(), Value::String(args.mac.clone()));

    for attr in &args.attrs {
        let (key, raw) = attr.split_once('=').ok_or_else(|| CliError::Validation {
            field: "attr".into(),
            reason: format!("expected KEY=VALUE, got '{attr}'"),
        })?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
        payload.insert(key.to_owned(), value);
    }

    Ok(payload)
}

fn detail(record: &Value) -> String {
    match record.as_object() {
        Some(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n"),
        None => record.to_string(),
    }
}

pub async fn handle(ctx: &Context, args: RegisterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let payload = build_payload(&args)?;
    let record = ctx.registry().register(payload).await?;

    let out = output::render_single(&global.output, &record, detail, |r| {
        r.get("_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_typed_attr_values() {
        let args = RegisterArgs {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            attrs: vec![
                "name=thermostat".into(),
                "floor=2".into(),
                "active=true".into(),
            ],
        };
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["mac"], "aa:bb:cc:dd:ee:ff");
        assert_eq!(payload["name"], "thermostat");
        assert_eq!(payload["floor"], 2);
        assert_eq!(payload["active"], true);
    }

    #[test]
    fn malformed_attr_is_rejected() {
        let args = RegisterArgs {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            attrs: vec!["no-equals-sign".into()],
        };
        assert!(build_payload(&args).is_err());
    }
}
