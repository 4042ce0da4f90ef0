pub mod booking;
pub mod city;
pub mod governorate;
pub mod guide;
pub mod guide_location;
pub mod place;
pub mod region;
pub mod user;
