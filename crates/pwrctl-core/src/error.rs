use thiserror::Error;

#[derive(Debug, Error)]
pub enum PsError {
    /// Hardware kept the station's power bits set past the poll budget.
    #[error("mac_id {mac_id} did not leave lps (ppwrbit=0x{last:08x})")]
    Timeout { mac_id: u8, last: u32 },

    #[error("data path restart failed: {reason}")]
    DataPathRestart { reason: String },

    #[error("mac_id {0} has no power bit window")]
    InvalidMacId(u8),
}

impl PsError {
    /// Poll timeouts surface to errno-style callers as EBUSY.
    pub fn is_busy(&self) -> bool {
        matches!(self, PsError::Timeout { .. })
    }
}
