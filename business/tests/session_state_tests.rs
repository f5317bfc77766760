//! Unit tests for session state types and their methods.

use roster_business::{
    BLOCKED_ACCOUNT_MARKER, BLOCKED_ACCOUNT_MESSAGE, PendingSessionToken, SessionCompute,
    SessionStatus,
};
use ustr::Ustr;

mod session_status_tests {
    use super::*;

    #[test]
    fn default_is_not_authenticated() {
        let status = SessionStatus::default();
        assert!(!status.is_authenticated());
        assert!(status.user_id().is_none());
        assert!(status.token().is_none());
        assert!(status.error().is_none());
    }

    #[test]
    fn authenticated_exposes_identity() {
        let status = SessionStatus::Authenticated {
            user_id: Ustr::from("u1"),
            email: "admin@example.com".to_owned(),
            token: "jwt".to_owned(),
        };
        assert!(status.is_authenticated());
        assert_eq!(status.user_id(), Some(Ustr::from("u1")));
        assert_eq!(status.token(), Some("jwt"));
    }

    #[test]
    fn authenticating_is_not_authenticated() {
        let status = SessionStatus::Authenticating;
        assert!(!status.is_authenticated());
        assert!(status.user_id().is_none());
    }

    #[test]
    fn failed_exposes_the_message_only() {
        let status = SessionStatus::Failed("Invalid login credentials".to_owned());
        assert!(!status.is_authenticated());
        assert_eq!(status.error(), Some("Invalid login credentials"));
        assert!(status.token().is_none());
    }
}

mod session_compute_tests {
    use super::*;

    #[test]
    fn default_is_signed_out() {
        let session = SessionCompute::default();
        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn new_authenticated_builds_a_live_session() {
        let session = SessionCompute::new_authenticated(Ustr::from("u9"), "ops@example.com", "jwt");
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(Ustr::from("u9")));
        assert_eq!(session.token(), Some("jwt"));
    }

    #[test]
    fn delegates_to_status() {
        let session = SessionCompute {
            status: SessionStatus::Failed("nope".to_owned()),
        };
        assert!(!session.is_authenticated());
        assert_eq!(session.error(), Some("nope"));
    }
}

#[test]
fn pending_token_defaults_to_none() {
    let pending = PendingSessionToken::default();
    assert!(pending.token.is_none());
}

#[test]
fn blocked_message_does_not_leak_the_marker() {
    // The user-facing text must stand on its own; the marker is an
    // upstream implementation detail.
    assert!(!BLOCKED_ACCOUNT_MESSAGE.contains(BLOCKED_ACCOUNT_MARKER));
}
