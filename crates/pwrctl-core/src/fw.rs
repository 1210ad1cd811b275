use tokio::sync::mpsc;
use tracing::warn;

use crate::hal::Firmware;
use pwrctl_proto::{H2cCommand, LpsParam};

pub type H2cReceiver = mpsc::UnboundedReceiver<H2cCommand>;

/// Host-to-chip command queue. Pushing never blocks; the transport side
/// drains the receiver.
#[derive(Debug, Clone)]
pub struct H2cQueue {
    tx: mpsc::UnboundedSender<H2cCommand>,
}

impl H2cQueue {
    pub fn new() -> (Self, H2cReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn push(&self, cmd: H2cCommand) {
        if let Err(e) = self.tx.send(cmd) {
            warn!("h2c: transport gone, dropping {:?}", e.0);
        }
    }
}

impl Firmware for H2cQueue {
    fn send_lps_param(&self, param: &LpsParam) {
        self.push(H2cCommand::LpsParam(*param));
    }

    fn power_mode_change(&self, enter: bool) {
        self.push(H2cCommand::PowerMode { enter });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_in_order() {
        let (q, mut rx) = H2cQueue::new();
        q.send_lps_param(&LpsParam::legacy_ps(2));
        q.power_mode_change(true);
        q.clone().power_mode_change(false);

        assert_eq!(rx.try_recv().unwrap(), H2cCommand::LpsParam(LpsParam::legacy_ps(2)));
        assert_eq!(rx.try_recv().unwrap(), H2cCommand::PowerMode { enter: true });
        assert_eq!(rx.try_recv().unwrap(), H2cCommand::PowerMode { enter: false });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_not_fatal() {
        let (q, rx) = H2cQueue::new();
        drop(rx);
        q.send_lps_param(&LpsParam::active(0));
        q.power_mode_change(false);
    }
}
