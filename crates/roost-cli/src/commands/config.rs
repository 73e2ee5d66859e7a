//! Kiosk document read and edit
//!
//! `config set` rewrites the whole document: the current document is
//! loaded, the single key replaced, and the result validated and saved
//! atomically through the store.

use anyhow::{Context, Result};

use roost_core::{ConfigStore, HostConfig, KioskConfig};

use crate::output::print_success;

/// Print the kiosk document, or a single (possibly dotted) key
pub fn config_get(config: &HostConfig, key: Option<&str>) -> Result<()> {
    let store = ConfigStore::new(config.kiosk_config_path.clone());
    let kiosk = store
        .get()
        .with_context(|| format!("Failed to load {:?}", config.kiosk_config_path))?;

    let document =
        toml::Value::try_from(&kiosk).context("Failed to render kiosk configuration")?;

    match key {
        None => print!("{}", toml::to_string_pretty(&document)?),
        Some(key) => {
            let value = lookup(&document, key)
                .with_context(|| format!("Key not found: {}", key))?;
            print_value(value)?;
        }
    }

    Ok(())
}

/// Replace a single key and save the document back through validation
pub fn config_set(config: &HostConfig, key: &str, value: &str) -> Result<()> {
    let store = ConfigStore::new(config.kiosk_config_path.clone());
    let current = store
        .load_or_init()
        .with_context(|| format!("Failed to load {:?}", config.kiosk_config_path))?;

    let mut document =
        toml::Value::try_from(&current).context("Failed to render kiosk configuration")?;
    insert(&mut document, key, parse_scalar(value))
        .with_context(|| format!("Cannot set key: {}", key))?;

    let updated: KioskConfig = document
        .try_into()
        .with_context(|| format!("Value does not fit the kiosk document at {}", key))?;
    store.save(&updated)?;

    print_success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Navigate a dotted key path through nested tables
fn lookup<'a>(document: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    let mut current = document;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Set a dotted key path, creating intermediate tables as needed
fn insert(document: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| anyhow::anyhow!("empty key"))?;

    let mut current = document
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("document is not a table"))?;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("{} is not a table", part))?;
    }

    current.insert(last.to_string(), value);
    Ok(())
}

/// Best-effort typed parse of a command-line value
fn parse_scalar(value: &str) -> toml::Value {
    if value == "true" {
        toml::Value::Boolean(true)
    } else if value == "false" {
        toml::Value::Boolean(false)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn print_value(value: &toml::Value) -> Result<()> {
    match value {
        toml::Value::String(s) => println!("{}", s),
        toml::Value::Integer(i) => println!("{}", i),
        toml::Value::Float(f) => println!("{}", f),
        toml::Value::Boolean(b) => println!("{}", b),
        toml::Value::Datetime(d) => println!("{}", d),
        toml::Value::Array(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        toml::Value::Table(_) => print!("{}", toml::to_string_pretty(value)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::HostConfig;

    fn host_config(dir: &tempfile::TempDir) -> HostConfig {
        HostConfig {
            kiosk_config_path: dir.path().join("kiosk.toml"),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(parse_scalar("true"), toml::Value::Boolean(true));
        assert_eq!(parse_scalar("80"), toml::Value::Integer(80));
        assert_eq!(parse_scalar("1.5"), toml::Value::Float(1.5));
        assert_eq!(
            parse_scalar("http://localhost"),
            toml::Value::String("http://localhost".to_string())
        );
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = host_config(&dir);

        config_set(&config, "web_port", "8080").unwrap();

        let store = ConfigStore::new(config.kiosk_config_path.clone());
        assert_eq!(store.get().unwrap().web_port, 8080);
    }

    #[test]
    fn test_set_rejects_out_of_range_value() {
        let dir = tempfile::tempdir().unwrap();
        let config = host_config(&dir);

        // browser_scale is bounded; the save must be refused and the
        // document left at its previous value
        assert!(config_set(&config, "browser_scale", "9.0").is_err());

        let store = ConfigStore::new(config.kiosk_config_path.clone());
        assert_eq!(store.get().unwrap().browser_scale, 1.0);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = host_config(&dir);

        assert!(config_set(&config, "no_such_key", "1").is_err());
    }

    #[test]
    fn test_lookup_dotted_key() {
        let document: toml::Value = toml::from_str(
            "web_port = 80\n[display_unit]\naddress = \"display:22\"\n",
        )
        .unwrap();

        assert_eq!(
            lookup(&document, "display_unit.address"),
            Some(&toml::Value::String("display:22".to_string()))
        );
        assert!(lookup(&document, "display_unit.missing").is_none());
    }
}
