//! Domain value types decoded from packet content.
//!
//! Values are constructed from byte slices by the parsers and never mutate.
//! Each type carries its own wire encode/decode pair so the encoder and the
//! round-trip tests share one definition of the format.

mod coordinates;
mod course;
mod datetime;
pub mod imei;
mod lbs;
mod terminal;
mod timezone;

pub use coordinates::Coordinates;
pub use course::CourseStatus;
pub use datetime::DateTime;
pub use imei::Imei;
pub use lbs::{Lbs4G, LbsInfo, NeighborCell};
pub use terminal::TerminalInfo;
pub use timezone::TimezoneLanguage;
