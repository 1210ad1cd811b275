use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsFlag {
    /// Firmware low power gate is engaged.
    LowPowerMode,
    LeisurePowerSave,
    InactivePowerSave,
}

impl PsFlag {
    fn bit(self) -> u32 {
        match self {
            PsFlag::LowPowerMode => 1 << 0,
            PsFlag::LeisurePowerSave => 1 << 1,
            PsFlag::InactivePowerSave => 1 << 2,
        }
    }
}

/// Device power flags. Safe to read from outside the device lock.
#[derive(Debug, Default)]
pub struct PsFlags(AtomicU32);

impl PsFlags {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Sets the flag, returning whether it was already set.
    pub fn test_and_set(&self, flag: PsFlag) -> bool {
        self.0.fetch_or(flag.bit(), Ordering::AcqRel) & flag.bit() != 0
    }

    /// Clears the flag, returning whether it was set.
    pub fn test_and_clear(&self, flag: PsFlag) -> bool {
        self.0.fetch_and(!flag.bit(), Ordering::AcqRel) & flag.bit() != 0
    }

    pub fn set(&self, flag: PsFlag) {
        self.0.fetch_or(flag.bit(), Ordering::AcqRel);
    }

    pub fn clear(&self, flag: PsFlag) {
        self.0.fetch_and(!flag.bit(), Ordering::AcqRel);
    }

    pub fn test(&self, flag: PsFlag) -> bool {
        self.0.load(Ordering::Acquire) & flag.bit() != 0
    }

    pub fn snapshot(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}
