pub mod admin;
pub mod medicines;
pub mod orders;
pub mod patients;
pub mod prescriptions;
pub mod supplier;
