pub mod coerce;
pub mod rfq;
pub mod solt;

pub use rfq::{RfqField, RfqRecord};
pub use solt::{LinePatch, LineRequest, NewLine, SoltLine, SoltTab, SoltView};
