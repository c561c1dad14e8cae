pub use super::contracts::Entity as Contracts;
pub use super::users::Entity as Users;
