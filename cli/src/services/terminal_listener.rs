use client::SessionListener;
use client::auth::SessionNotice;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Command that starts a new session from the terminal.
pub const LOGIN_HINT: &str = "gstongo login --email <email>";

/// Session listener for a terminal host.
///
/// There is no login view to navigate to, so an expired session prints the
/// notice with a hint to sign in again. Failures are printed as they
/// happen and remembered so `main` does not print them twice.
pub struct TerminalListener {
    out: Mutex<Box<dyn Write + Send>>,
    reported: AtomicBool,
}

impl TerminalListener {
    /// Listener writing to standard error.
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            reported: AtomicBool::new(false),
        }
    }

    /// Whether anything has been shown to the user yet.
    pub fn has_reported(&self) -> bool {
        self.reported.load(Ordering::SeqCst)
    }

    /// Prints a command failure unless the listener already showed one.
    pub fn report_failure(&self, error: &dyn std::fmt::Display) {
        if self.has_reported() {
            log::debug!("Already reported, suppressing: {error}");
            return;
        }
        self.print(&format!("Error: {error}"));
    }

    fn print(&self, text: &str) {
        self.reported.store(true, Ordering::SeqCst);
        match self.out.lock() {
            Ok(mut out) => {
                if let Err(e) = writeln!(out, "{text}") {
                    log::warn!("Failed to write to terminal: {e}");
                }
            }
            Err(_) => log::warn!("Terminal writer lock poisoned, dropping: {text}"),
        }
    }
}

impl SessionListener for TerminalListener {
    fn on_session_expired(&self, notice: &SessionNotice) {
        log::info!("Session expired, login required at {}", notice.login_path);
        self.print(&format!(
            "{}\nRun `{LOGIN_HINT}` to sign in again.",
            notice.message
        ));
    }

    fn on_error(&self, message: &str) {
        self.print(&format!("Error: {message}"));
    }
}
