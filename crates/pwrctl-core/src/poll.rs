use std::time::{Duration, Instant};

use crate::config::PsConfig;
use crate::error::PsError;
use crate::hal::Registers;

/// Per-station power enable bits, one nibble per mac_id.
pub const R_PPWRBIT_SETTING: u32 = 0xD500;

const PWR_EN_BIT: u32 = 0xE;
const MAX_MAC_ID: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval: Duration::from_micros(1000), timeout: Duration::from_micros(50_000) }
    }
}

impl From<&PsConfig> for PollConfig {
    fn from(cfg: &PsConfig) -> Self {
        Self {
            interval: Duration::from_micros(cfg.poll_interval_us),
            timeout: Duration::from_micros(cfg.poll_timeout_us),
        }
    }
}

impl PollConfig {
    /// Reads issued before giving up on a register that never settles.
    pub fn max_reads(&self) -> u32 {
        let step = self.step().as_micros().max(1);
        (self.timeout.as_micros() / step) as u32 + 1
    }

    fn step(&self) -> Duration {
        self.interval.max(Duration::from_micros(1))
    }
}

pub fn ppwrbit_mask(mac_id: u8) -> Result<u32, PsError> {
    if mac_id > MAX_MAC_ID {
        return Err(PsError::InvalidMacId(mac_id));
    }
    Ok(PWR_EN_BIT << (4 * mac_id as u32))
}

/// Polls until the station's power bits read zero.
///
/// The budget is charged per delay rather than against wall time, so the
/// number of reads is fixed by the config: one read, then one per interval
/// until the timeout is spent. Never sleeps the thread.
pub fn poll_until_zero<R>(regs: &R, cfg: &PollConfig, mac_id: u8) -> Result<(), PsError>
where
    R: Registers + ?Sized,
{
    let mask = ppwrbit_mask(mac_id)?;
    let step = cfg.step();
    let mut left = cfg.timeout;

    loop {
        let val = regs.read32_mask(R_PPWRBIT_SETTING, mask);
        if val == 0 {
            return Ok(());
        }
        if left.is_zero() {
            return Err(PsError::Timeout { mac_id, last: val });
        }
        spin_delay(step);
        left = left.saturating_sub(step);
    }
}

fn spin_delay(d: Duration) {
    let until = Instant::now() + d;
    while Instant::now() < until {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reads nonzero until the `settle`-th read.
    struct Settling {
        reads: AtomicU32,
        settle: Option<u32>,
        last_mask: AtomicU32,
    }

    impl Settling {
        fn new(settle: Option<u32>) -> Self {
            Self { reads: AtomicU32::new(0), settle, last_mask: AtomicU32::new(0) }
        }
    }

    impl Registers for Settling {
        fn read32_mask(&self, reg: u32, mask: u32) -> u32 {
            assert_eq!(reg, R_PPWRBIT_SETTING);
            self.last_mask.store(mask, Ordering::Relaxed);
            let n = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
            match self.settle {
                Some(k) if n >= k => 0,
                _ => mask,
            }
        }
    }

    fn fast() -> PollConfig {
        PollConfig { interval: Duration::from_micros(10), timeout: Duration::from_micros(500) }
    }

    #[test]
    fn test_mask_window() {
        assert_eq!(ppwrbit_mask(0).unwrap(), 0xE);
        assert_eq!(ppwrbit_mask(1).unwrap(), 0xE0);
        assert_eq!(ppwrbit_mask(3).unwrap(), 0xE000);
        assert!(matches!(ppwrbit_mask(8), Err(PsError::InvalidMacId(8))));
    }

    #[test]
    fn test_settles_immediately() {
        let regs = Settling::new(Some(1));
        poll_until_zero(&regs, &PollConfig::default(), 0).unwrap();
        assert_eq!(regs.reads.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_settles_after_k_reads() {
        let regs = Settling::new(Some(5));
        poll_until_zero(&regs, &PollConfig::default(), 2).unwrap();
        assert_eq!(regs.reads.load(Ordering::Relaxed), 5);
        assert_eq!(regs.last_mask.load(Ordering::Relaxed), 0xE00);
    }

    #[test]
    fn test_timeout_after_full_budget() {
        let regs = Settling::new(None);
        let cfg = fast();
        let started = Instant::now();
        let err = poll_until_zero(&regs, &cfg, 0).unwrap_err();
        assert!(matches!(err, PsError::Timeout { mac_id: 0, last: 0xE }));
        assert_eq!(regs.reads.load(Ordering::Relaxed), cfg.max_reads());
        assert_eq!(cfg.max_reads(), 51);
        assert!(started.elapsed() >= cfg.timeout);
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(PollConfig::default().max_reads(), 51);
    }

    #[test]
    fn test_zero_interval_still_terminates() {
        let regs = Settling::new(None);
        let cfg = PollConfig { interval: Duration::ZERO, timeout: Duration::from_micros(20) };
        assert!(poll_until_zero(&regs, &cfg, 0).is_err());
        assert_eq!(regs.reads.load(Ordering::Relaxed), 21);
    }

    #[test]
    fn test_invalid_mac_id_skips_read() {
        let regs = Settling::new(Some(1));
        assert!(poll_until_zero(&regs, &fast(), 9).is_err());
        assert_eq!(regs.reads.load(Ordering::Relaxed), 0);
    }
}
