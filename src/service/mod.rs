pub mod rfq;
pub mod seed;
pub mod solt;

pub use rfq::RfqService;
pub use solt::SoltService;
