//! Stubbed streaming-service session.
//!
//! The streaming integration is a placeholder: the login handshake is
//! simulated and only flips a session flag shown in the status line. The
//! command surface matches what a real PKCE flow would need later.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn,
}

#[derive(Clone, Debug, Default)]
pub struct StreamingClient {
    state: SessionState,
}

impl StreamingClient {
    /// Simulated login handshake; always succeeds.
    pub fn login(&mut self) -> &'static str {
        self.state = SessionState::LoggedIn;
        "login-ok"
    }

    pub fn logout(&mut self) -> &'static str {
        self.state = SessionState::LoggedOut;
        "logout-ok"
    }

    /// Flip the session state, returning the acknowledgement string.
    pub fn toggle(&mut self) -> &'static str {
        match self.state {
            SessionState::LoggedOut => self.login(),
            SessionState::LoggedIn => self.logout(),
        }
    }

    pub fn logged_in(&self) -> bool {
        self.state == SessionState::LoggedIn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_logout_flip_the_session_flag() {
        let mut client = StreamingClient::default();
        assert!(!client.logged_in());

        assert_eq!(client.login(), "login-ok");
        assert!(client.logged_in());

        assert_eq!(client.logout(), "logout-ok");
        assert!(!client.logged_in());
    }

    #[test]
    fn toggle_alternates() {
        let mut client = StreamingClient::default();
        assert_eq!(client.toggle(), "login-ok");
        assert_eq!(client.toggle(), "logout-ok");
        assert_eq!(client.toggle(), "login-ok");
    }
}
