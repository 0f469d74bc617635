pub mod codec;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod packet;
pub mod parsers;
pub mod protocol;
pub mod session;
pub mod splitter;
pub mod types;

pub use decoder::{Decoder, DecoderBuilder, DecoderConfig, StreamDecode};
pub use encoder::{AddressResponseParams, Encoder};
pub use error::{DecodeError, EncodeError, FieldError, SessionError};
pub use packet::Packet;
pub use session::{PacketHandler, Session, SessionConfig, SessionMap};
