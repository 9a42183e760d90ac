pub mod csv;
pub mod health;
pub mod leads;
pub mod members;
pub mod overview;
