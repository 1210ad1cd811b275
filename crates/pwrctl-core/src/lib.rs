pub mod config;
pub mod device;
pub mod doctor;
pub mod error;
pub mod flags;
pub mod fw;
pub mod hal;
pub mod poll;
pub mod sim;
pub mod vif;

mod ips;
mod lps;
mod mode;

pub use config::PsConfig;
pub use device::{PsDevice, PsGuard, PsStatus};
pub use error::PsError;
pub use flags::{PsFlag, PsFlags};
pub use hal::{Backend, RadioState};
pub use vif::{Vif, VifTable, WifiRole};

pub use pwrctl_proto::{H2cCommand, LastRpwm, LpsParam, PsMode};
