//! Cookie rendering and the cookie store seam used by the CSRF manager

use crate::config::CsrfConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub max_age_secs: u64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Cookie {
    /// Session cookie carrying an anti-forgery token
    pub fn csrf(config: &CsrfConfig, token: &str) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: token.to_string(),
            domain: config.domain.clone(),
            path: "/".to_string(),
            max_age_secs: config.max_age_secs,
            http_only: true,
            secure: true,
            same_site: SameSite::Strict,
        }
    }

    /// Value of a `Set-Cookie` header
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Domain={}; Path={}",
            self.name,
            self.value,
            self.max_age_secs,
            self.domain,
            self.path
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str("; SameSite=");
        header.push_str(self.same_site.as_str());
        header
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header_value())
    }
}

/// Where issued cookies go (a response builder, a browser jar, ...)
pub trait CookieStore: Send + Sync {
    fn set_cookie(&self, cookie: Cookie);

    fn get_cookie(&self, name: &str) -> Option<Cookie>;
}

/// Cookie jar kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, Cookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Set-Cookie` header values for every stored cookie
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = self.cookies
            .lock()
            .values()
            .map(Cookie::to_header_value)
            .collect();
        headers.sort();
        headers
    }
}

impl CookieStore for MemoryCookieStore {
    fn set_cookie(&self, cookie: Cookie) {
        self.cookies.lock().insert(cookie.name.clone(), cookie);
    }

    fn get_cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.lock().get(name).cloned()
    }
}
