//! clickreplay core library: recorded input logs, their binary format and
//! cursor-driven playback, shared by the CLI and embedding hosts.

mod codec;
mod config;
mod error;
mod event;
mod event_log;
mod fsutil;
mod playback;
mod store;

mod cmd {
    pub mod edit_cmd;
    pub mod inspect_cmd;
    pub mod play_cmd;
}

pub use cmd::edit_cmd::*;
pub use cmd::inspect_cmd::*;
pub use cmd::play_cmd::*;
pub use codec::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use event_log::*;
pub use fsutil::*;
pub use playback::*;
pub use store::*;
