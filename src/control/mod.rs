pub mod request;
pub mod service;

pub use request::{parse_control_request, ValidationError, INVALID_CONTROL_DATA};
pub use service::{CommandDispatcher, DispatchError};
