use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Encoded size of the LPS parameter H2C block (two dwords).
pub const LPS_PARM_LEN: usize = 8;

// Fixed fields the firmware expects alongside every LPS request.
const RLBM: u32 = 1;
const SMART_PS: u32 = 1;
const AWAKE_INTERVAL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsMode {
    Active,
    Legacy,
}

impl PsMode {
    pub fn wire(self) -> u8 {
        match self {
            PsMode::Active => 0,
            PsMode::Legacy => 1,
        }
    }
}

/// Last RPWM value the host reports to firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastRpwm {
    Active,
    PowerSave,
}

impl LastRpwm {
    pub fn wire(self) -> u8 {
        match self {
            LastRpwm::PowerSave => 0x4,
            LastRpwm::Active => 0x6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpsParam {
    pub mac_id: u8,
    pub ps_mode: PsMode,
    pub last_rpwm: LastRpwm,
}

impl Default for LpsParam {
    fn default() -> Self {
        Self::active(0)
    }
}

impl LpsParam {
    /// Request for a station entering leisure power save.
    pub fn legacy_ps(mac_id: u8) -> Self {
        Self { mac_id, ps_mode: PsMode::Legacy, last_rpwm: LastRpwm::PowerSave }
    }

    /// Request for a station returning to active.
    pub fn active(mac_id: u8) -> Self {
        Self { mac_id, ps_mode: PsMode::Active, last_rpwm: LastRpwm::Active }
    }

    /// H2C layout:
    /// dw0 = macid[7:0] psmode[15:8] rlbm[19:16] smartps[23:20] awake[31:24]
    /// dw1 = uapsd vo/vi/be/bk[3:0] (all clear) lastrpwm[15:8]
    pub fn encode(&self) -> Bytes {
        let dw0 = self.mac_id as u32
            | (self.ps_mode.wire() as u32) << 8
            | RLBM << 16
            | SMART_PS << 20
            | AWAKE_INTERVAL << 24;
        let dw1 = (self.last_rpwm.wire() as u32) << 8;

        let mut buf = BytesMut::with_capacity(LPS_PARM_LEN);
        buf.put_u32_le(dw0);
        buf.put_u32_le(dw1);
        buf.freeze()
    }
}

/// Commands carried on the host-to-chip queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum H2cCommand {
    LpsParam(LpsParam),
    PowerMode { enter: bool },
}
