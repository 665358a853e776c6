/// Log tags identify the subsystem a message comes from
///
/// The debug key of a tag is what `--debug-<key>` matches on.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Cache,
    RateLimit,
    Csrf,
    Donation,
    Test,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::RateLimit => "ratelimit".to_string(),
            LogTag::Csrf => "csrf".to_string(),
            LogTag::Donation => "donation".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Uncolored label as printed in the log prefix
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Cache => "CACHE".to_string(),
            LogTag::RateLimit => "RATELIMIT".to_string(),
            LogTag::Csrf => "CSRF".to_string(),
            LogTag::Donation => "DONATION".to_string(),
            LogTag::Test => "TEST".to_string(),
            LogTag::Other(s) => s.to_uppercase(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
