use std::env;
use std::fs;
use std::path::PathBuf;

/// Session context handed to every networking call. `invalidate` is the
/// single entry point that logs the client out.
pub struct Session {
    token: Option<String>,
    token_path: Option<PathBuf>,
}

impl Session {
    /// Token from TASKNEST_TOKEN, falling back to ~/.tasknest/token
    pub fn load() -> Self {
        let token_path =
            env::var_os("HOME").map(|home| PathBuf::from(home).join(".tasknest").join("token"));

        if let Ok(token) = env::var("TASKNEST_TOKEN") {
            let trimmed = token.trim().to_string();
            if !trimmed.is_empty() {
                return Self {
                    token: Some(trimmed),
                    token_path,
                };
            }
        }

        let token = token_path
            .as_ref()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|raw| raw.trim().to_string())
            .filter(|token| !token.is_empty());

        Self { token, token_path }
    }

    /// In-memory session, used by tests
    pub fn with_token(token: Option<&str>) -> Self {
        Self {
            token: token.map(String::from),
            token_path: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Store a fresh token and persist it for the next run
    pub fn set_token(&mut self, token: String) {
        if let Some(path) = &self.token_path {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(err) = fs::write(path, &token) {
                eprintln!("Failed to persist token: {}", err);
            }
        }
        self.token = Some(token);
    }

    /// Drop the cached token, in memory and on disk
    pub fn invalidate(&mut self) {
        self.token = None;
        if let Some(path) = &self.token_path {
            let _ = fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_clears_the_token() {
        let mut session = Session::with_token(Some("tok-1"));
        assert!(session.is_logged_in());

        session.invalidate();
        assert!(!session.is_logged_in());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn set_token_replaces_the_current_one() {
        let mut session = Session::with_token(None);
        session.set_token("tok-2".to_string());
        assert_eq!(session.token(), Some("tok-2"));
    }
}
