//! Collaborators the power coordinator drives. Every method takes `&self`;
//! implementations bring their own interior mutability.

use anyhow::Result;
use serde::Serialize;

use crate::vif::Vif;
use pwrctl_proto::LpsParam;

/// Radio control ownership reported to the coexistence engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioState {
    /// Firmware owns RF control (LPS engaged).
    FwControl,
    WlOn,
}

pub trait Firmware {
    /// Fire-and-forget H2C push.
    fn send_lps_param(&self, param: &LpsParam);
    fn power_mode_change(&self, enter: bool);
}

pub trait Registers {
    /// Must not sleep; the poller calls this from a busy-wait loop.
    fn read32_mask(&self, reg: u32, mask: u32) -> u32;
}

pub trait HciLink {
    fn link_ps(&self, enable: bool);
}

pub trait DataPath {
    fn core_start(&self) -> Result<()>;
    fn core_stop(&self);
    fn set_channel(&self);
}

pub trait Coex {
    fn notify_radio_state(&self, state: RadioState);
}

pub trait VifConfig {
    fn remove_vif_cfg(&self, vif: &Vif);
    fn restore_vif_cfg(&self, vif: &Vif);
}

pub trait Backend: Firmware + Registers + HciLink + DataPath + Coex + VifConfig + Send + Sync {}

impl<T> Backend for T where T: Firmware + Registers + HciLink + DataPath + Coex + VifConfig + Send + Sync {}
