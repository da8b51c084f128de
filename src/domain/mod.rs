pub mod availability;
pub mod booking;
pub mod filters;
pub mod paging;
pub mod pricing;
pub mod profile;
pub mod review;
pub mod space;
