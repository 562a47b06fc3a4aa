//! In-memory access token holder.
//!
//! An empty token means "unauthenticated". Tokens never expire here; the
//! caller clears them explicitly.

#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    access_token: String,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &str {
        &self.access_token
    }

    /// Replace the current token unconditionally.
    pub fn set(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    pub fn clear(&mut self) {
        self.access_token.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_clear() {
        let mut store = TokenStore::new();
        assert!(store.is_empty());

        store.set("abc");
        assert_eq!(store.get(), "abc");

        store.set("def");
        assert_eq!(store.get(), "def");

        store.clear();
        assert_eq!(store.get(), "");
        assert!(store.is_empty());
    }
}
