//! List commands implementation

use i2cbridge_bus::{available_adapters, list_attached_devices};

/// List all adapters compiled into this build
pub fn list_adapters() {
    println!("Supported adapters:");
    println!();

    for adapter in available_adapters() {
        let aliases = if adapter.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", adapter.aliases.join(", "))
        };
        println!("  {:<8} - {}{}", adapter.name, adapter.description, aliases);
    }
}

/// List attached USB bridges
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = list_attached_devices()?;

    if devices.is_empty() {
        println!("No adapters found.");
        return Ok(());
    }

    println!("{:<18} Description", "Adapter");
    println!("{}", "-".repeat(60));
    for device in devices {
        println!("{:<18} {}", device.selector, device.description);
    }

    Ok(())
}
