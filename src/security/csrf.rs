/// Anti-forgery token issuing and validation
///
/// One token is active per manager (one manager per session). It is created
/// on first use from the OS random source, written to the `XSRF-TOKEN`
/// cookie and echoed back by clients in the `X-CSRF-Token` header.
///
/// Validation compares lengths first and only then runs a constant-time
/// comparison, so a mismatching length returns early. Token length is fixed
/// and public, so the only thing that early exit reveals is that the
/// candidate has the wrong length.
use super::cookie::{ Cookie, CookieStore };
use crate::config::CsrfConfig;
use crate::core::constants::{ CSRF_TOKEN_BYTES, SYMBOL_LOCK };
use crate::core::KitResult;
use crate::logger::{ self, LogTag };
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Cryptographically secure byte source
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// Operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

pub struct CsrfManager {
    config: CsrfConfig,
    entropy: Arc<dyn EntropySource>,
    cookies: Arc<dyn CookieStore>,
    token: Mutex<Option<String>>,
}

impl CsrfManager {
    pub fn new(config: CsrfConfig, cookies: Arc<dyn CookieStore>) -> Self {
        Self::with_entropy(config, cookies, Arc::new(OsEntropy))
    }

    pub fn with_entropy(
        config: CsrfConfig,
        cookies: Arc<dyn CookieStore>,
        entropy: Arc<dyn EntropySource>
    ) -> Self {
        logger::debug(
            LogTag::Csrf,
            &format!("CSRF manager initialized for domain {}", config.domain)
        );
        Self {
            config,
            entropy,
            cookies,
            token: Mutex::new(None),
        }
    }

    /// Current token, generated and persisted on first call
    pub fn get_token(&self) -> KitResult<String> {
        let mut token = self.token.lock();
        if let Some(existing) = token.as_ref() {
            return Ok(existing.clone());
        }

        let fresh = self.issue_token()?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Header map to attach to outgoing state-changing requests
    pub fn get_headers(&self) -> KitResult<HashMap<String, String>> {
        let token = self.get_token()?;
        Ok(HashMap::from([(self.config.header_name.clone(), token)]))
    }

    /// Check a candidate token against the active one
    pub async fn validate(&self, candidate: &str) -> bool {
        let active = match self.token.lock().clone() {
            Some(token) => token,
            None => {
                return false;
            }
        };

        if candidate.is_empty() || candidate.len() != active.len() {
            return false;
        }

        bool::from(candidate.as_bytes().ct_eq(active.as_bytes()))
    }

    /// Replace the active token, e.g. after login or logout
    ///
    /// The old token stops validating even if issuing the new one fails.
    pub fn refresh_token(&self) -> KitResult<String> {
        let mut token = self.token.lock();
        *token = None;
        let fresh = self.issue_token()?;
        *token = Some(fresh.clone());
        logger::info(LogTag::Csrf, &format!("{} CSRF token rotated", SYMBOL_LOCK));
        Ok(fresh)
    }

    pub fn has_token(&self) -> bool {
        self.token.lock().is_some()
    }

    pub fn header_name(&self) -> &str {
        &self.config.header_name
    }

    /// Generate a token and write its cookie
    ///
    /// RNG failures propagate; there is no weaker fallback.
    fn issue_token(&self) -> KitResult<String> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        if let Err(e) = self.entropy.fill(&mut bytes) {
            logger::error_with(
                LogTag::Csrf,
                "Secure random source failed, refusing to issue token",
                &[("error", e.to_string())]
            );
            return Err(e.into());
        }

        let token = hex::encode(bytes);
        self.cookies.set_cookie(Cookie::csrf(&self.config, &token));
        logger::debug(LogTag::Csrf, "Issued new CSRF token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KitError;
    use crate::security::cookie::MemoryCookieStore;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "no entropy")))
        }
    }

    /// Fills successfully a fixed number of times, then fails
    struct ExhaustingEntropy {
        remaining: AtomicUsize,
    }

    impl EntropySource for ExhaustingEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
            let allowed = self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if allowed {
                OsEntropy.fill(dest)
            } else {
                BrokenEntropy.fill(dest)
            }
        }
    }

    fn manager() -> (CsrfManager, Arc<MemoryCookieStore>) {
        let store = Arc::new(MemoryCookieStore::new());
        (CsrfManager::new(CsrfConfig::default(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (csrf, _) = manager();
        let token = csrf.get_token().unwrap();

        assert_eq!(token.len(), CSRF_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(csrf.validate(&token).await);
    }

    #[tokio::test]
    async fn test_rejects_wrong_tokens() {
        let (csrf, _) = manager();
        let token = csrf.get_token().unwrap();

        let mut same_length = token.clone();
        let flipped = if same_length.ends_with('0') { "1" } else { "0" };
        same_length.replace_range(token.len() - 1.., flipped);

        assert!(!csrf.validate(&same_length).await);
        assert!(!csrf.validate(&"z".repeat(CSRF_TOKEN_BYTES * 2)).await);
        assert!(!csrf.validate("short").await);
        assert!(!csrf.validate("").await);
    }

    #[tokio::test]
    async fn test_validate_without_token_is_false() {
        let (csrf, _) = manager();
        assert!(!csrf.validate("anything").await);
        assert!(!csrf.has_token());
    }

    #[test]
    fn test_token_is_reused() {
        let (csrf, _) = manager();
        assert_eq!(csrf.get_token().unwrap(), csrf.get_token().unwrap());
    }

    #[tokio::test]
    async fn test_refresh_invalidates_old_token() {
        let (csrf, store) = manager();
        let old = csrf.get_token().unwrap();
        let new = csrf.refresh_token().unwrap();

        assert_ne!(old, new);
        assert!(!csrf.validate(&old).await);
        assert!(csrf.validate(&new).await);
        assert_eq!(store.get_cookie("XSRF-TOKEN").unwrap().value, new);
    }

    #[test]
    fn test_cookie_written_with_security_attributes() {
        let (csrf, store) = manager();
        let token = csrf.get_token().unwrap();

        let cookie = store.get_cookie("XSRF-TOKEN").unwrap();
        assert_eq!(cookie.value, token);
        let header = cookie.to_header_value();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("Max-Age=7200"));
        assert!(header.contains("Domain=localhost"));
    }

    #[test]
    fn test_headers() {
        let (csrf, _) = manager();
        let headers = csrf.get_headers().unwrap();
        assert_eq!(headers.get("X-CSRF-Token"), Some(&csrf.get_token().unwrap()));
    }

    #[tokio::test]
    async fn test_entropy_failure_propagates() {
        let store = Arc::new(MemoryCookieStore::new());
        let csrf = CsrfManager::with_entropy(
            CsrfConfig::default(),
            store.clone(),
            Arc::new(BrokenEntropy)
        );

        let err = csrf.get_token().unwrap_err();
        assert!(matches!(err, KitError::Entropy(_)));
        assert!(err.is_critical());
        assert!(csrf.refresh_token().is_err());
        assert!(!csrf.has_token());
        assert!(store.get_cookie("XSRF-TOKEN").is_none());
        assert!(!csrf.validate("").await);
    }

    #[tokio::test]
    async fn test_failed_refresh_discards_old_token() {
        let store = Arc::new(MemoryCookieStore::new());
        let csrf = CsrfManager::with_entropy(
            CsrfConfig::default(),
            store.clone(),
            Arc::new(ExhaustingEntropy { remaining: AtomicUsize::new(1) })
        );

        let old = csrf.get_token().unwrap();
        assert!(csrf.validate(&old).await);

        assert!(matches!(csrf.refresh_token(), Err(KitError::Entropy(_))));
        assert!(!csrf.has_token());
        assert!(!csrf.validate(&old).await);
    }
}
