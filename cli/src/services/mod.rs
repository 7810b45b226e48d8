pub mod password;
pub mod terminal_listener;

pub use password::SecurePassword;
pub use terminal_listener::TerminalListener;
