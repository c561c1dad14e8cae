pub mod prelude;

pub mod contracts;
pub mod users;
