use serde::{Deserialize, Serialize};

/// Who is running a wizard and where to send them afterwards
///
/// Handed to the session when the wizard mounts and cleared when it completes
/// or exits. Steps read it from the session, never from ambient storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: Option<String>,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    pub redirect_to: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            auth_token: Some(auth_token.into()),
            redirect_to: None,
        }
    }

    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect_to = Some(target.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.auth_token.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_forgets_everything() {
        let mut ctx = SessionContext::authenticated("u-1", "secret").with_redirect("/dashboard");
        assert!(ctx.is_authenticated());
        ctx.clear();
        assert_eq!(ctx, SessionContext::anonymous());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_token_never_serialized() {
        let ctx = SessionContext::authenticated("u-1", "secret");
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"userId\":\"u-1\""));
        assert!(!json.contains("secret"));
    }
}
