pub mod medicine;
pub mod order;
pub mod prescription;
pub mod user;
