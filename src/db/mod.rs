pub mod bookings;
pub mod connection;
pub mod profiles;
pub mod reviews;
pub mod spaces;

pub use connection::Database;
