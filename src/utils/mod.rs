pub mod geo;
pub mod jwt;
pub mod password;
pub mod pricing;
pub mod slug;
