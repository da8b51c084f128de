pub mod auth_tests;
pub mod listing_tests;
pub mod search_tests;
