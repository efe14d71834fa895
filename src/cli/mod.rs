pub mod caps;
pub mod context;
pub mod locate;
pub mod output;
pub mod status;

pub use caps::cmd_caps;
pub use context::CliContext;
pub use locate::{cmd_locate, LocateArgs};
pub use output::OutputFormat;
pub use status::{cmd_status, StatusArgs};
