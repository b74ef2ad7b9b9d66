pub mod health;
pub mod rfq;
pub mod solt;
