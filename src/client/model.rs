//! Arguments and composite results of the façade calls that do not map onto a
//! single upstream message.

use crate::api::common::{DeviceClass, Location, Region};
use crate::api::device::{Device, DeviceActivation, DeviceKeys, DeviceStatus};
use crate::api::gateway::Gateway;
use crate::api::multicast_group::{MulticastGroup, MulticastGroupSchedulingType, MulticastGroupType};

/// Paging and filtering applied to list calls. Both values reach the server
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub search: String,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new(limit: u32, search: impl Into<String>) -> Self {
        Self {
            limit,
            search: search.into(),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, "")
    }
}

/// Result of `DeviceService/Get`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device: Device,
    pub status: Option<DeviceStatus>,
    pub class_enabled: DeviceClass,
}

/// A device with its key material and activation state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceView {
    pub device: Device,
    pub status: Option<DeviceStatus>,
    pub class_enabled: DeviceClass,
    pub keys: DeviceKeys,
    pub activation: DeviceActivation,
}

impl DeviceView {
    pub fn new(record: DeviceRecord, keys: DeviceKeys, activation: DeviceActivation) -> Self {
        Self {
            device: record.device,
            status: record.status,
            class_enabled: record.class_enabled,
            keys,
            activation,
        }
    }
}

/// Everything needed to register an activated device.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct NewDevice {
    pub application_id: String,
    pub device_profile_id: String,
    pub dev_eui: String,
    pub name: String,
    pub description: String,
    pub join_eui: String,
    pub dev_addr: String,
    pub app_s_key: String,
    pub nwk_s_enc_key: String,
    pub app_key: String,
}

impl std::fmt::Debug for NewDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDevice")
            .field("application_id", &self.application_id)
            .field("device_profile_id", &self.device_profile_id)
            .field("dev_eui", &self.dev_eui)
            .field("name", &self.name)
            .field("join_eui", &self.join_eui)
            .field("dev_addr", &self.dev_addr)
            .finish_non_exhaustive()
    }
}

impl NewDevice {
    pub fn record(&self) -> Device {
        Device {
            dev_eui: self.dev_eui.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            application_id: self.application_id.clone(),
            device_profile_id: self.device_profile_id.clone(),
            join_eui: self.join_eui.clone(),
        }
    }

    /// LoRaWAN 1.0.x devices have a single root key; it is stored as `nwk_key`.
    pub fn keys(&self) -> DeviceKeys {
        DeviceKeys {
            dev_eui: self.dev_eui.clone(),
            nwk_key: self.app_key.clone(),
            app_key: String::new(),
        }
    }

    /// 1.0.x session: the three network session keys are the same key.
    pub fn activation(&self) -> DeviceActivation {
        DeviceActivation {
            dev_eui: self.dev_eui.clone(),
            dev_addr: self.dev_addr.clone(),
            app_s_key: self.app_s_key.clone(),
            nwk_s_enc_key: self.nwk_s_enc_key.clone(),
            s_nwk_s_int_key: self.nwk_s_enc_key.clone(),
            f_nwk_s_int_key: self.nwk_s_enc_key.clone(),
            ..Default::default()
        }
    }
}

/// Arguments of `create_gateway`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewGateway {
    pub gateway_id: String,
    pub tenant_id: String,
    /// Defaults to `eui-<gateway_id>`.
    pub name: Option<String>,
    /// Defaults to `eui-<gateway_id>`.
    pub description: Option<String>,
    pub location: Location,
    pub stats_interval: u32,
}

impl NewGateway {
    pub fn record(&self) -> Gateway {
        let fallback = format!("eui-{}", self.gateway_id);
        Gateway {
            gateway_id: self.gateway_id.clone(),
            name: self.name.clone().unwrap_or_else(|| fallback.clone()),
            description: self.description.clone().unwrap_or(fallback),
            location: Some(self.location),
            tenant_id: self.tenant_id.clone(),
            stats_interval: self.stats_interval,
        }
    }
}

/// Arguments of `create_multicast_group`. Groups are always Class-C with
/// GPS-time scheduling.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct NewMulticastGroup {
    pub application_id: String,
    pub name: String,
    pub region: Region,
    pub mc_addr: String,
    pub mc_nwk_s_key: String,
    pub mc_app_s_key: String,
    pub f_cnt: u32,
    pub dr: u32,
    pub frequency: u32,
}

impl std::fmt::Debug for NewMulticastGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewMulticastGroup")
            .field("application_id", &self.application_id)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("mc_addr", &self.mc_addr)
            .finish_non_exhaustive()
    }
}

impl NewMulticastGroup {
    pub fn record(&self) -> MulticastGroup {
        MulticastGroup {
            id: String::new(),
            name: self.name.clone(),
            application_id: self.application_id.clone(),
            region: self.region as i32,
            mc_addr: self.mc_addr.clone(),
            mc_nwk_s_key: self.mc_nwk_s_key.clone(),
            mc_app_s_key: self.mc_app_s_key.clone(),
            f_cnt: self.f_cnt,
            group_type: MulticastGroupType::ClassC as i32,
            dr: self.dr,
            frequency: self.frequency,
            class_c_scheduling_type: MulticastGroupSchedulingType::GpsTime as i32,
        }
    }
}
