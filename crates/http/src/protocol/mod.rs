//! Protocol types shared by the codec and connection layers.
//!
//! - [`Message`]: either a decoded header or a piece of payload
//! - [`PayloadItem`]: one payload chunk or the end-of-payload marker
//! - [`PayloadSize`]: how many body bytes follow a header
//! - [`RequestHeader`]: the request line and headers of one request
//! - [`ResponseHead`]: a response before its body is attached
//! - [`HttpError`], [`ParseError`], [`SendError`]: failures on either side of the exchange

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
