//! Auth slice: the signed-in user and the login dialog.

use book_kart_core::models::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub is_logged_in: bool,
    /// Never persisted; a reload always starts with the dialog closed.
    #[serde(skip)]
    pub login_dialog_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    SetUser(User),
    ClearUser,
    ToggleLoginDialog,
    /// Mark the session signed in before the user record is loaded.
    AuthStatus,
}

impl AuthState {
    #[must_use]
    pub fn reduce(self, action: AuthAction) -> Self {
        match action {
            AuthAction::SetUser(user) => Self {
                user: Some(user),
                is_logged_in: true,
                ..self
            },
            AuthAction::ClearUser => Self {
                user: None,
                is_logged_in: false,
                ..self
            },
            AuthAction::ToggleLoginDialog => Self {
                login_dialog_open: !self.login_dialog_open,
                ..self
            },
            AuthAction::AuthStatus => Self {
                is_logged_in: true,
                ..self
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "name": "Asha",
            "email": "asha@example.com"
        }))
        .unwrap()
    }

    #[test]
    fn test_set_then_clear_is_initial() {
        let state = AuthState::default()
            .reduce(AuthAction::SetUser(user()))
            .reduce(AuthAction::ClearUser);
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn test_set_user_replaces() {
        let mut other = user();
        other.name = "Ravi".to_string();
        let state = AuthState::default()
            .reduce(AuthAction::SetUser(user()))
            .reduce(AuthAction::SetUser(other.clone()));
        assert_eq!(state.user, Some(other));
        assert!(state.is_logged_in);
    }

    #[test]
    fn test_toggle_dialog() {
        let state = AuthState::default().reduce(AuthAction::ToggleLoginDialog);
        assert!(state.login_dialog_open);
        assert!(!state.reduce(AuthAction::ToggleLoginDialog).login_dialog_open);
    }

    #[test]
    fn test_auth_status_keeps_user_slot() {
        let state = AuthState::default().reduce(AuthAction::AuthStatus);
        assert!(state.is_logged_in);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_dialog_flag_is_not_serialized() {
        let state = AuthState::default().reduce(AuthAction::ToggleLoginDialog);
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("loginDialogOpen").is_none());
        let back: AuthState = serde_json::from_value(json).unwrap();
        assert!(!back.login_dialog_open);
    }
}
