pub mod action;
pub mod api;
pub mod error;
pub mod transport;

pub use action::{Action, ActionRequest, ParseActionError, dispatch};
pub use api::{ChefClient, NodeRunList};
pub use error::{ApiError, TransportError};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
