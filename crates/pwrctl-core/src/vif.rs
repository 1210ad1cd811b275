use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WifiRole {
    Station,
    Ap,
    Monitor,
    AdHoc,
    P2pClient,
    P2pGo,
    Mesh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vif {
    pub mac_id: u8,
    pub role: WifiRole,
    pub addr: [u8; 6],
}

impl Vif {
    pub fn new(mac_id: u8, role: WifiRole) -> Self {
        Self { mac_id, role, addr: [0x00, 0xe0, 0x4c, 0x00, 0x00, mac_id] }
    }

    pub fn is_station(&self) -> bool {
        self.role == WifiRole::Station
    }
}

/// Active virtual interfaces. Registration is driven by the vif manager;
/// the power coordinator only iterates.
#[derive(Debug, Default)]
pub struct VifTable {
    vifs: RwLock<Vec<Vif>>,
}

impl VifTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vif, replacing any existing entry with the same mac_id.
    pub fn add(&self, vif: Vif) {
        let mut vifs = self.vifs.write().unwrap_or_else(PoisonError::into_inner);
        vifs.retain(|v| v.mac_id != vif.mac_id);
        vifs.push(vif);
    }

    pub fn remove(&self, mac_id: u8) -> Option<Vif> {
        let mut vifs = self.vifs.write().unwrap_or_else(PoisonError::into_inner);
        let idx = vifs.iter().position(|v| v.mac_id == mac_id)?;
        Some(vifs.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.vifs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Vif> {
        self.vifs.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Runs `f` over a snapshot taken under the table lock. The lock is
    /// released before `f` runs, so `f` may add or remove vifs without
    /// affecting the current pass.
    pub fn iterate_atomic<F>(&self, mut f: F)
    where
        F: FnMut(&Vif),
    {
        for vif in self.snapshot().iter() {
            f(vif);
        }
    }
}
