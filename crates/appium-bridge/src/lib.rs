pub mod actions;
mod assert;
pub mod bootstrap;
pub mod config;
pub mod device;
pub mod errors;
pub mod gestures;
pub mod guard;
pub mod mapping;
pub mod model;
pub mod ports;
pub mod remote;
pub mod state;
pub mod trace;
pub mod transport;
mod wait;

pub use bootstrap::{AppiumHelper, CapabilityFilter, HelperBlock};
pub use config::{AppiumConfig, SessionConfig, Timeouts, WindowSize};
pub use errors::{AppiumError, AppiumResult};
pub use mapping::{ServerAddress, SessionEndpoint};
pub use model::{
    FieldValue, NetworkConnection, Orientation, Point, RotateGesture, SessionRequest,
    SwipeDirection,
};
pub use ports::{
    AutomationClient, ClientError, ElementRef, NoopWebActions, SessionFactory, WebActions,
};
pub use remote::{RemoteClient, RemoteSessionFactory};
pub use state::{ModeResolver, ModeState};
pub use trace::ActionTracer;
pub use transport::{ReqwestTransport, RestRequest, RestTransport, TransportError};
