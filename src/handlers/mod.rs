pub mod admin;
pub mod auth;
pub mod bookings;
pub mod console;
pub mod guide;
pub mod public;
pub mod uploads;
