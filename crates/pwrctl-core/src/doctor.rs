use anyhow::Result;

use crate::config::PsConfig;

// The confirmation poll spins in atomic context; keep it well under a tick.
const MAX_POLL_TIMEOUT_US: u64 = 1_000_000;

pub fn check_ps_config(cfg: &PsConfig) -> Result<()> {
    anyhow::ensure!(cfg.poll_interval_us > 0, "ps.poll_interval_us must be > 0");
    anyhow::ensure!(
        cfg.poll_timeout_us >= cfg.poll_interval_us,
        "ps.poll_timeout_us ({}) shorter than poll_interval_us ({})",
        cfg.poll_timeout_us,
        cfg.poll_interval_us
    );
    anyhow::ensure!(
        cfg.poll_timeout_us <= MAX_POLL_TIMEOUT_US,
        "ps.poll_timeout_us too large for a busy-wait; set <= {}",
        MAX_POLL_TIMEOUT_US
    );
    Ok(())
}
