use tracing::debug;

use crate::device::PsGuard;
use crate::flags::PsFlag;
use crate::hal::Backend;

impl<'a, B: Backend> PsGuard<'a, B> {
    /// Engages the firmware low power gate. Repeated calls are no-ops.
    pub fn enter_ps_mode(&mut self) {
        if !self.dev.ps_mode_enabled() {
            return;
        }
        if self.dev.flags().test_and_set(PsFlag::LowPowerMode) {
            return;
        }
        debug!("ps: enter low power mode");
        self.dev.backend().power_mode_change(true);
    }

    pub fn leave_ps_mode(&mut self) {
        if !self.dev.ps_mode_enabled() {
            return;
        }
        if self.dev.flags().test_and_clear(PsFlag::LowPowerMode) {
            debug!("ps: leave low power mode");
            self.dev.backend().power_mode_change(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{SimBackend, SimEvent};
    use crate::{PsConfig, PsDevice, PsFlag};

    fn device(ps_mode: bool) -> PsDevice<SimBackend> {
        PsDevice::new(SimBackend::new(), &PsConfig { ps_mode, ..PsConfig::default() })
    }

    #[test]
    fn test_enter_twice_changes_mode_once() {
        let dev = device(true);
        let mut g = dev.lock();
        g.enter_ps_mode();
        g.enter_ps_mode();
        assert_eq!(dev.backend().journal(), vec![SimEvent::FwPowerMode { enter: true }]);
        assert!(dev.flags().test(PsFlag::LowPowerMode));
    }

    #[test]
    fn test_leave_without_enter_is_noop() {
        let dev = device(true);
        dev.lock().leave_ps_mode();
        assert!(dev.backend().journal().is_empty());
    }

    #[test]
    fn test_enter_leave_pair() {
        let dev = device(true);
        let mut g = dev.lock();
        g.enter_ps_mode();
        g.leave_ps_mode();
        g.leave_ps_mode();
        assert_eq!(
            dev.backend().journal(),
            vec![SimEvent::FwPowerMode { enter: true }, SimEvent::FwPowerMode { enter: false }]
        );
        assert!(!dev.flags().test(PsFlag::LowPowerMode));
    }

    #[test]
    fn test_disabled_mode_never_touches_firmware() {
        let dev = device(false);
        let mut g = dev.lock();
        g.enter_ps_mode();
        g.leave_ps_mode();
        assert!(dev.backend().journal().is_empty());
        assert!(!dev.flags().test(PsFlag::LowPowerMode));
    }
}
