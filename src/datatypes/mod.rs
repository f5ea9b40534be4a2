mod eto;
mod login;
mod login_response;
mod message;
mod payload;
mod replay;

pub use eto::{EtoBody, EtoKind, EtoPayload};
pub use login::{Login, SessionLogin};
pub use login_response::LoginResponse;
pub use message::Message;
pub use payload::{Body, Payload, PayloadKind};
pub use replay::Replay;
