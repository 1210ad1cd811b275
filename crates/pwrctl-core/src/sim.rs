//! In-memory backend that records every collaborator call. Drives the
//! `pwrctl simulate` command and the scenario tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use serde::Serialize;

use crate::fw::H2cQueue;
use crate::hal::{Coex, DataPath, Firmware, HciLink, RadioState, Registers, VifConfig};
use crate::vif::Vif;
use pwrctl_proto::LpsParam;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    LinkPs { enable: bool },
    FwLpsParam { param: LpsParam },
    FwPowerMode { enter: bool },
    CoexRadio { state: RadioState },
    RegRead { reg: u32, mask: u32, value: u32 },
    CoreStart { ok: bool },
    CoreStop,
    SetChannel,
    RemoveVifCfg { mac_id: u8 },
    RestoreVifCfg { mac_id: u8 },
}

#[derive(Debug)]
pub struct SimBackend {
    journal: Mutex<Vec<SimEvent>>,
    reads: AtomicU32,
    // None: power bits never clear.
    settle_after: Option<u32>,
    fail_core_start: AtomicBool,
    h2c: Option<H2cQueue>,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    /// Hardware that confirms LPS exit on the first read.
    pub fn new() -> Self {
        Self {
            journal: Mutex::new(Vec::new()),
            reads: AtomicU32::new(0),
            settle_after: Some(0),
            fail_core_start: AtomicBool::new(false),
            h2c: None,
        }
    }

    /// Power bits stay set for the first `n` reads, then read as clear.
    pub fn settle_after(mut self, n: u32) -> Self {
        self.settle_after = Some(n);
        self
    }

    pub fn stuck(mut self) -> Self {
        self.settle_after = None;
        self
    }

    pub fn fail_core_start(self, fail: bool) -> Self {
        self.fail_core_start.store(fail, Ordering::Relaxed);
        self
    }

    /// Also forward firmware calls onto a real H2C queue.
    pub fn with_h2c(mut self, q: H2cQueue) -> Self {
        self.h2c = Some(q);
        self
    }

    pub fn journal(&self) -> Vec<SimEvent> {
        self.events().clone()
    }

    pub fn clear(&self) {
        self.events().clear();
        self.reads.store(0, Ordering::Relaxed);
    }

    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&SimEvent) -> bool,
    {
        self.events().iter().filter(|e| pred(*e)).count()
    }

    pub fn fw_params(&self) -> Vec<LpsParam> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                SimEvent::FwLpsParam { param } => Some(*param),
                _ => None,
            })
            .collect()
    }

    pub fn reg_reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }

    fn events(&self) -> std::sync::MutexGuard<'_, Vec<SimEvent>> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, ev: SimEvent) {
        self.events().push(ev);
    }
}

impl Firmware for SimBackend {
    fn send_lps_param(&self, param: &LpsParam) {
        self.record(SimEvent::FwLpsParam { param: *param });
        if let Some(q) = &self.h2c {
            q.send_lps_param(param);
        }
    }

    fn power_mode_change(&self, enter: bool) {
        self.record(SimEvent::FwPowerMode { enter });
        if let Some(q) = &self.h2c {
            q.power_mode_change(enter);
        }
    }
}

impl Registers for SimBackend {
    fn read32_mask(&self, reg: u32, mask: u32) -> u32 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
        let value = match self.settle_after {
            Some(k) if n > k => 0,
            _ => mask,
        };
        self.record(SimEvent::RegRead { reg, mask, value });
        value
    }
}

impl HciLink for SimBackend {
    fn link_ps(&self, enable: bool) {
        self.record(SimEvent::LinkPs { enable });
    }
}

impl DataPath for SimBackend {
    fn core_start(&self) -> Result<()> {
        let ok = !self.fail_core_start.load(Ordering::Relaxed);
        self.record(SimEvent::CoreStart { ok });
        anyhow::ensure!(ok, "simulated core start failure");
        Ok(())
    }

    fn core_stop(&self) {
        self.record(SimEvent::CoreStop);
    }

    fn set_channel(&self) {
        self.record(SimEvent::SetChannel);
    }
}

impl Coex for SimBackend {
    fn notify_radio_state(&self, state: RadioState) {
        self.record(SimEvent::CoexRadio { state });
    }
}

impl VifConfig for SimBackend {
    fn remove_vif_cfg(&self, vif: &Vif) {
        self.record(SimEvent::RemoveVifCfg { mac_id: vif.mac_id });
    }

    fn restore_vif_cfg(&self, vif: &Vif) {
        self.record(SimEvent::RestoreVifCfg { mac_id: vif.mac_id });
    }
}
