use tracing::{debug, info};

use crate::device::PsGuard;
use crate::error::PsError;
use crate::flags::PsFlag;
use crate::hal::{Backend, RadioState};
use crate::poll::poll_until_zero;
use pwrctl_proto::LpsParam;

// Exit is always confirmed on the first station slot; see leave_lps_station.
const LPS_CHECK_MAC_ID: u8 = 0;

impl<'a, B: Backend> PsGuard<'a, B> {
    pub fn enter_lps(&mut self, mac_id: u8) {
        if self.dev.flags().test_and_set(PsFlag::LeisurePowerSave) {
            return;
        }
        debug!("lps: enter mac_id={}", mac_id);

        let dev = self.dev;
        let backend = dev.backend();
        backend.notify_radio_state(RadioState::FwControl);
        self.send_lps_param(LpsParam::legacy_ps(mac_id));

        self.enter_ps_mode();
        backend.link_ps(true);
    }

    pub fn leave_lps(&mut self) {
        if !self.dev.flags().test_and_clear(PsFlag::LeisurePowerSave) {
            return;
        }
        debug!("lps: leave");

        // link must be awake before per-station H2C traffic
        self.dev.backend().link_ps(false);

        let dev = self.dev;
        dev.vifs().iterate_atomic(|vif| {
            if !vif.is_station() {
                return;
            }
            self.leave_ps_mode();
            self.leave_lps_station(vif.mac_id);
        });
    }

    /// Coexistence override: when the coex engine takes control, LPS must
    /// be dropped regardless of who entered it.
    pub fn set_coex_ctrl_lps(&mut self, btc_ctrl: bool) {
        if btc_ctrl {
            self.leave_lps();
        }
    }

    fn leave_lps_station(&mut self, mac_id: u8) {
        debug!("lps: station exit mac_id={}", mac_id);
        self.send_lps_param(LpsParam::active(mac_id));

        // Confirmation is polled on slot 0 even for other mac_ids; only one
        // station per device is expected to be in LPS at a time.
        if let Err(e) = self.leave_lps_check(LPS_CHECK_MAC_ID) {
            if e.is_busy() {
                debug!("lps: mac_id={} exit unconfirmed, reporting wl on anyway", mac_id);
            }
        }

        self.dev.backend().notify_radio_state(RadioState::WlOn);
    }

    fn leave_lps_check(&self, mac_id: u8) -> Result<(), PsError> {
        poll_until_zero(self.dev.backend(), self.dev.poll_config(), mac_id)
            .inspect_err(|e| info!("lps: failed to leave lps state: {}", e))
    }
}
