//! Database Models

pub mod serde_helpers;

pub mod customer;
pub mod reservation;

pub use customer::{Customer, CustomerCreate, CustomerRole};
pub use reservation::{Reservation, ReservationCreate, ReservationCustomer, ReservationStatus};
