use std::fmt;
use std::io::{self, Write};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password held only as long as the login call needs it, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecurePassword(String);

impl SecurePassword {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurePassword(<redacted>)")
    }
}

/// Password input errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to read password: {0}")]
    Read(#[from] io::Error),
    #[error("Empty password provided")]
    Empty,
}

/// Rejects blank input, otherwise takes ownership of `raw`.
pub fn accept_password(raw: String) -> Result<SecurePassword, PasswordError> {
    let password = SecurePassword::new(raw);
    if password.as_str().trim().is_empty() {
        return Err(PasswordError::Empty);
    }
    Ok(password)
}

/// Prompts on stderr and reads a password from the terminal without echo.
pub fn prompt_password() -> Result<SecurePassword, PasswordError> {
    eprint!("Password: ");
    io::stderr().flush()?;

    accept_password(rpassword::read_password()?)
}
