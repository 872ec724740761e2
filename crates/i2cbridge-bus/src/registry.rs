//! Adapter registry and initialization
//!
//! This module opens bus adapters by name and wraps them in a [`BusHandle`].

use std::collections::HashMap;

#[allow(unused_imports)] // Used in feature-gated code
use i2cbridge_core::master::{BoxedI2cMaster, I2cMaster};

use crate::handle::BusHandle;

/// Keys handled for every adapter rather than passed to the adapter
const GENERIC_KEYS: &[&str] = &["pec", "restart"];

/// Parsed adapter parameters
#[derive(Debug, Clone)]
pub struct AdapterParams {
    /// Adapter name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl AdapterParams {
    /// Parameters meant for the adapter itself, as `(key, value)` pairs
    fn adapter_options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .filter(|(k, _)| !GENERIC_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Parse a boolean parameter (`0`/`1`/`false`/`true`/`off`/`on`)
    fn flag(&self, key: &str) -> Result<Option<bool>, Box<dyn std::error::Error>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        match value.as_str() {
            "1" | "true" | "on" | "yes" => Ok(Some(true)),
            "0" | "false" | "off" | "no" => Ok(Some(false)),
            _ => Err(format!("Invalid value for {}: '{}' (expected 0 or 1)", key, value).into()),
        }
    }
}

/// Parse an adapter string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_adapter_params("ch341:index=1")?;
/// assert_eq!(params.name, "ch341");
/// assert_eq!(params.params.get("index"), Some(&"1".to_string()));
/// ```
pub fn parse_adapter_params(s: &str) -> Result<AdapterParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    if name.is_empty() {
        return Err("Missing adapter name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            match opt.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    params.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(
                        format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                    );
                }
            }
        }
    }

    Ok(AdapterParams {
        name: name.to_string(),
        params,
    })
}

/// Open a bus adapter and create a BusHandle
///
/// This is the main entry point for the CLI. It handles:
/// 1. Parsing the adapter string
/// 2. Opening the appropriate adapter with its own options
/// 3. Applying the generic `pec` and `restart` options
///
/// # Example
/// ```ignore
/// let mut bus = open_bus("ch341:speed=400,pec=1")?;
/// let word = bus.read_word_data(0x0B, 0x08)?;
/// ```
pub fn open_bus(adapter: &str) -> Result<BusHandle, Box<dyn std::error::Error>> {
    let params = parse_adapter_params(adapter)?;

    let (name, master): (&str, BoxedI2cMaster) = match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => ("dummy", open_dummy(&params)?),

        #[cfg(feature = "ch341")]
        "ch341" | "ch341a" | "ch341_i2c" => ("ch341", open_ch341(&params)?),

        _ => return Err(format!("Unknown adapter: {}", params.name).into()),
    };

    #[allow(unreachable_code)]
    let mut handle = BusHandle::new(master, name);

    if let Some(pec) = params.flag("pec")? {
        handle.set_pec(pec)?;
        log::debug!("PEC {}", if pec { "enabled" } else { "disabled" });
    }
    if let Some(restart) = params.flag("restart")? {
        handle.set_repeated_start(restart);
        log::debug!(
            "Register reads use {}",
            if restart { "repeated START" } else { "STOP + START" }
        );
    }

    Ok(handle)
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &AdapterParams) -> Result<BoxedI2cMaster, Box<dyn std::error::Error>> {
    use i2cbridge_dummy::{DummyBus, DummyConfig};

    log::info!("Opening dummy bus...");

    let mut bus = match params.params.get("profile") {
        Some(path) => {
            let config = DummyConfig::load_file(std::path::Path::new(path))
                .map_err(|e| format!("Failed to load dummy profile {}: {}", path, e))?;
            DummyBus::from_config(&config)?
        }
        None => DummyBus::new_default(),
    };

    for (key, value) in params.adapter_options() {
        match key {
            "profile" => {}
            "speed" => {
                let khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid speed value: {}", value))?;
                bus.set_speed_khz(khz)?;
            }
            _ => log::warn!("Unknown dummy option: {}={}", key, value),
        }
    }

    Ok(Box::new(bus))
}

#[cfg(feature = "ch341")]
fn open_ch341(params: &AdapterParams) -> Result<BoxedI2cMaster, Box<dyn std::error::Error>> {
    log::info!("Opening CH341 adapter...");

    let config = i2cbridge_ch341::parse_options(&params.adapter_options())?;
    let master = i2cbridge_ch341::Ch341::open_with_config(config).map_err(|e| {
        format!(
            "Failed to open CH341: {}\nMake sure the device is connected and you have permissions.",
            e
        )
    })?;

    Ok(Box::new(master))
}

/// Information about an available adapter
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available adapters (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_adapters() -> Vec<AdapterInfo> {
    let mut adapters = Vec::new();

    #[cfg(feature = "dummy")]
    adapters.push(AdapterInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory bus emulator for testing (profile=<file.ron>)",
    });

    #[cfg(feature = "ch341")]
    adapters.push(AdapterInfo {
        name: "ch341",
        aliases: &["ch341a", "ch341_i2c"],
        description: "CH341 USB-to-I2C bridge (VID:1a86 PID:5512) (speed=<kHz>,index=<n>)",
    });

    adapters
}

/// A physical adapter found on the host
#[derive(Debug, Clone)]
pub struct AttachedDevice {
    /// Adapter string that opens this device
    pub selector: String,
    /// Human-readable description
    pub description: String,
}

/// Enumerate attached hardware adapters
#[allow(unused_mut)]
pub fn list_attached_devices() -> Result<Vec<AttachedDevice>, Box<dyn std::error::Error>> {
    let mut found = Vec::new();

    #[cfg(feature = "ch341")]
    for (index, info) in i2cbridge_ch341::Ch341::list_devices()?.into_iter().enumerate() {
        found.push(AttachedDevice {
            selector: format!("ch341:index={}", index),
            description: info.to_string(),
        });
    }

    Ok(found)
}

/// Generate a short list of adapter names for CLI help
pub fn adapter_names_short() -> String {
    let adapters = available_adapters();
    if adapters.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = adapters.iter().map(|a| a.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let params = parse_adapter_params("ch341").unwrap();
        assert_eq!(params.name, "ch341");
        assert!(params.params.is_empty());
    }

    #[test]
    fn test_parse_with_params() {
        let params = parse_adapter_params("ch341:index=1,speed=400").unwrap();
        assert_eq!(params.name, "ch341");
        assert_eq!(params.params.get("index").map(String::as_str), Some("1"));
        assert_eq!(params.params.get("speed").map(String::as_str), Some("400"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_adapter_params("ch341:index").is_err());
        assert!(parse_adapter_params("ch341:=1").is_err());
        assert!(parse_adapter_params(":pec=1").is_err());
    }

    #[test]
    fn test_adapter_options_skip_generic_keys() {
        let params = parse_adapter_params("ch341:pec=1,restart=0,speed=400").unwrap();
        assert_eq!(params.adapter_options(), vec![("speed", "400")]);
    }

    #[test]
    fn test_flag_values() {
        let params = parse_adapter_params("x:pec=1,restart=off,bad=maybe").unwrap();
        assert_eq!(params.flag("pec").unwrap(), Some(true));
        assert_eq!(params.flag("restart").unwrap(), Some(false));
        assert_eq!(params.flag("missing").unwrap(), None);
        assert!(params.flag("bad").is_err());
    }

    #[test]
    fn test_unknown_adapter() {
        let err = open_bus("nonexistent").unwrap_err();
        assert!(err.to_string().contains("Unknown adapter"));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        let mut bus = open_bus("dummy").unwrap();
        assert_eq!(bus.adapter(), "dummy");
        assert!(!bus.pec());
        assert!(bus.detect(0x50).unwrap());
        assert!(!bus.detect(0x51).unwrap());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_generic_options() {
        let bus = open_bus("dummy:pec=1,restart=1,speed=400").unwrap();
        assert!(bus.pec());
        assert!(bus.repeated_start());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_bad_options() {
        assert!(open_bus("dummy:pec=2").is_err());
        assert!(open_bus("dummy:speed=fast").is_err());
        assert!(open_bus("dummy:profile=/nonexistent/profile.ron").is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_available_adapters() {
        let adapters = available_adapters();
        assert!(adapters.iter().any(|a| a.name == "dummy"));
        assert!(adapter_names_short().contains("dummy"));
    }
}
