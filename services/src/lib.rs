pub mod attendance;
pub mod classroom;
pub mod error;
pub mod geo;
pub mod user;

pub use error::ServiceError;

#[cfg(test)]
pub(crate) mod test_support;
