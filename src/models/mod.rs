pub mod activity_log;
pub mod investment;
pub mod otp_code;
pub mod product;
pub mod transaction;
pub mod user;

pub use product::Product;
