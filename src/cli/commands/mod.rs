mod init;
mod serve;
mod user;

pub use init::cmd_init;
pub use serve::cmd_serve;
pub use user::{cmd_create_user, cmd_hash_password};
