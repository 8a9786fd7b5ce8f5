pub const DEFAULT_LOGIN: &str = "username";
pub const DEFAULT_PASS: &str = "password";

/// Decides whether a login form submission is accepted.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, login: &str, pass: &str) -> bool;
}

/// Accepts exactly one login/password pair.
///
/// Comparison is exact: with the default pair, a submitted `pass=password.`
/// is rejected with 403 because the trailing period is part of the value.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    login: String,
    pass: String,
}

impl StaticCredentials {
    pub fn new(login: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            pass: pass.into(),
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN, DEFAULT_PASS)
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, login: &str, pass: &str) -> bool {
        login == self.login && pass == self.pass
    }
}
