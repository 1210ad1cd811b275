use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::PsConfig;
use crate::flags::{PsFlag, PsFlags};
use crate::hal::Backend;
use crate::poll::PollConfig;
use crate::vif::VifTable;
use pwrctl_proto::LpsParam;

/// State guarded by the device mutex.
#[derive(Debug, Default)]
struct PsState {
    // Scratch buffer for the last LPS request; rewritten on every send.
    lps_param: LpsParam,
}

pub struct PsDevice<B> {
    backend: B,
    flags: PsFlags,
    ps_mode: bool,
    poll: PollConfig,
    vifs: VifTable,
    state: Mutex<PsState>,
}

/// Proof that the device mutex is held. LPS and power mode transitions
/// are only reachable through it.
pub struct PsGuard<'a, B> {
    pub(crate) dev: &'a PsDevice<B>,
    state: MutexGuard<'a, PsState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsStatus {
    pub ps_mode_enabled: bool,
    pub low_power_mode: bool,
    pub leisure_ps: bool,
    pub inactive_ps: bool,
    pub vif_count: usize,
}

impl<B: Backend> PsDevice<B> {
    pub fn new(backend: B, cfg: &PsConfig) -> Self {
        Self {
            backend,
            flags: PsFlags::new(),
            ps_mode: cfg.ps_mode,
            poll: PollConfig::from(cfg),
            vifs: VifTable::new(),
            state: Mutex::new(PsState::default()),
        }
    }

    pub fn lock(&self) -> PsGuard<'_, B> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        PsGuard { dev: self, state }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn flags(&self) -> &PsFlags {
        &self.flags
    }

    pub fn vifs(&self) -> &VifTable {
        &self.vifs
    }

    pub fn ps_mode_enabled(&self) -> bool {
        self.ps_mode
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Lock-free view of the power flags.
    pub fn status(&self) -> PsStatus {
        PsStatus {
            ps_mode_enabled: self.ps_mode,
            low_power_mode: self.flags.test(PsFlag::LowPowerMode),
            leisure_ps: self.flags.test(PsFlag::LeisurePowerSave),
            inactive_ps: self.flags.test(PsFlag::InactivePowerSave),
            vif_count: self.vifs.len(),
        }
    }
}

impl<'a, B: Backend> PsGuard<'a, B> {
    /// Last LPS request handed to firmware.
    pub fn lps_param(&self) -> LpsParam {
        self.state.lps_param
    }

    /// Records `param` as the current request and pushes it to firmware.
    pub(crate) fn send_lps_param(&mut self, param: LpsParam) {
        self.state.lps_param = param;
        self.dev.backend.send_lps_param(&self.state.lps_param);
    }
}
