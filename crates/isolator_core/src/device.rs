//! Audio Device Enumeration and Lookup

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Input,
    Output,
}

/// Summary of an audio device for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDevice {
    pub name: String,
    pub device_type: DeviceType,
    pub is_default: bool,
    /// Largest channel count over all supported configs
    pub max_channels: u16,
}

impl AudioDevice {
    /// Enumerate all input and output devices on the default host
    pub fn enumerate_all() -> EngineResult<Vec<AudioDevice>> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        let default_input = host.default_input_device().and_then(|d| d.name().ok());
        let default_output = host.default_output_device().and_then(|d| d.name().ok());

        if let Ok(inputs) = host.input_devices() {
            devices.extend(
                inputs.filter_map(|d| Self::describe(&d, DeviceType::Input, default_input.as_deref())),
            );
        }
        if let Ok(outputs) = host.output_devices() {
            devices.extend(
                outputs.filter_map(|d| Self::describe(&d, DeviceType::Output, default_output.as_deref())),
            );
        }

        if devices.is_empty() {
            return Err(EngineError::NoDevicesFound);
        }
        Ok(devices)
    }

    fn describe(device: &cpal::Device, device_type: DeviceType, default_name: Option<&str>) -> Option<Self> {
        let name = device.name().ok()?;
        let max_channels = match device_type {
            DeviceType::Input => device
                .supported_input_configs()
                .ok()
                .and_then(|configs| configs.map(|c| c.channels()).max()),
            DeviceType::Output => device
                .supported_output_configs()
                .ok()
                .and_then(|configs| configs.map(|c| c.channels()).max()),
        }
        .unwrap_or(2);

        Some(AudioDevice {
            is_default: default_name == Some(name.as_str()),
            name,
            device_type,
            max_channels,
        })
    }
}

/// Find a device by name, or the system default when `name` is `None`
pub fn find_device(device_type: DeviceType, name: Option<&str>) -> EngineResult<cpal::Device> {
    let host = cpal::default_host();

    let Some(name) = name else {
        let device = match device_type {
            DeviceType::Input => host.default_input_device(),
            DeviceType::Output => host.default_output_device(),
        };
        return device.ok_or(EngineError::NoDevicesFound);
    };

    let mut devices = match device_type {
        DeviceType::Input => host.input_devices(),
        DeviceType::Output => host.output_devices(),
    }
    .map_err(|e| EngineError::DeviceNotFound(e.to_string()))?;

    devices
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| EngineError::DeviceNotFound(name.to_string()))
}
