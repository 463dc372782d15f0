use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// A selectable capture device with its human-readable name.
pub struct CpalDeviceInfo {
    pub name: String,
    pub device: cpal::Device,
}

/// List the input devices of the default host.
///
/// Devices without a usable default input config are skipped rather than
/// failing the whole enumeration (common with loopback endpoints on Linux).
pub fn list_input_devices() -> Result<Vec<CpalDeviceInfo>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate input devices: {}", e))?;

    let mut infos = Vec::new();
    for device in devices {
        let name = match device.name() {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Skipping unnamed input device: {}", e);
                continue;
            }
        };
        if device.default_input_config().is_err() {
            log::debug!("Skipping input device without default config: {}", name);
            continue;
        }
        infos.push(CpalDeviceInfo { name, device });
    }

    Ok(infos)
}
