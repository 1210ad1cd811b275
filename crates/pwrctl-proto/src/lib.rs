pub mod lps;

pub use lps::{H2cCommand, LastRpwm, LpsParam, PsMode, LPS_PARM_LEN};
