use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PsConfig {
    /// Firmware low power mode is available on this device.
    #[serde(default = "default_ps_mode")]
    pub ps_mode: bool,

    /// Busy-wait between LPS exit confirmation reads.
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,

    /// Total busy-wait budget for LPS exit confirmation.
    #[serde(default = "default_poll_timeout_us")]
    pub poll_timeout_us: u64,
}

impl Default for PsConfig {
    fn default() -> Self {
        Self {
            ps_mode: default_ps_mode(),
            poll_interval_us: default_poll_interval_us(),
            poll_timeout_us: default_poll_timeout_us(),
        }
    }
}

fn default_ps_mode() -> bool { true }
fn default_poll_interval_us() -> u64 { 1000 }
fn default_poll_timeout_us() -> u64 { 50_000 }
