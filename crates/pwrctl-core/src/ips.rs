use tracing::{debug, error};

use crate::device::PsDevice;
use crate::error::PsError;
use crate::flags::PsFlag;
use crate::hal::Backend;

// IPS runs from the idle/control path, which serializes these calls itself;
// they do not take the device mutex.
impl<B: Backend> PsDevice<B> {
    pub fn enter_ips(&self) {
        debug!("ips: enter");
        self.flags().set(PsFlag::InactivePowerSave);

        let backend = self.backend();
        self.vifs().iterate_atomic(|vif| backend.remove_vif_cfg(vif));

        backend.core_stop();
        backend.link_ps(true);
    }

    pub fn leave_ips(&self) {
        debug!("ips: leave");
        let backend = self.backend();
        backend.link_ps(false);

        if let Err(e) = self.restart_data_path() {
            error!("ips: failed to leave idle state: {}", e);
        }

        backend.set_channel();
        self.vifs().iterate_atomic(|vif| backend.restore_vif_cfg(vif));

        self.flags().clear(PsFlag::InactivePowerSave);
    }

    fn restart_data_path(&self) -> Result<(), PsError> {
        self.backend()
            .core_start()
            .map_err(|e| PsError::DataPathRestart { reason: format!("{:#}", e) })
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{SimBackend, SimEvent};
    use crate::{PsConfig, PsDevice, PsFlag, Vif, WifiRole};

    fn device(backend: SimBackend) -> PsDevice<SimBackend> {
        let dev = PsDevice::new(backend, &PsConfig::default());
        dev.vifs().add(Vif::new(0, WifiRole::Station));
        dev.vifs().add(Vif::new(1, WifiRole::Ap));
        dev
    }

    #[test]
    fn test_enter_order() {
        let dev = device(SimBackend::new());
        dev.enter_ips();
        let j = dev.backend().journal();
        assert_eq!(j.len(), 4);
        assert!(matches!(j[0], SimEvent::RemoveVifCfg { .. }));
        assert!(matches!(j[1], SimEvent::RemoveVifCfg { .. }));
        assert_eq!(j[2], SimEvent::CoreStop);
        assert_eq!(j[3], SimEvent::LinkPs { enable: true });
        assert!(dev.flags().test(PsFlag::InactivePowerSave));
    }

    #[test]
    fn test_leave_order() {
        let dev = device(SimBackend::new());
        dev.enter_ips();
        dev.backend().clear();
        dev.leave_ips();
        let j = dev.backend().journal();
        assert_eq!(j[0], SimEvent::LinkPs { enable: false });
        assert_eq!(j[1], SimEvent::CoreStart { ok: true });
        assert_eq!(j[2], SimEvent::SetChannel);
        assert_eq!(dev.backend().count(|e| matches!(e, SimEvent::RestoreVifCfg { .. })), 2);
        assert!(!dev.flags().test(PsFlag::InactivePowerSave));
    }

    #[test]
    fn test_enter_not_short_circuited() {
        let dev = device(SimBackend::new());
        dev.enter_ips();
        dev.enter_ips();
        assert_eq!(dev.backend().count(|e| *e == SimEvent::CoreStop), 2);
    }

    #[test]
    fn test_leave_completes_when_core_start_fails() {
        let dev = device(SimBackend::new().fail_core_start(true));
        dev.enter_ips();
        dev.leave_ips();
        let b = dev.backend();
        assert_eq!(b.count(|e| *e == SimEvent::CoreStart { ok: false }), 1);
        assert_eq!(b.count(|e| *e == SimEvent::SetChannel), 1);
        assert_eq!(b.count(|e| matches!(e, SimEvent::RestoreVifCfg { .. })), 2);
        assert!(!dev.flags().test(PsFlag::InactivePowerSave));
    }
}
