pub mod change_password;
pub mod claims;
pub mod login;
pub mod logout;
pub mod register;
pub mod session;

pub use change_password::handle_change_password;
pub use login::handle_login;
pub use login::handle_me;
pub use logout::handle_logout;
pub use register::handle_register;
