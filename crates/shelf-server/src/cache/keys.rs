//! Shared store key layout.

use std::fmt;

/// Keys used in the shared store, all derived from one prefix.
///
/// # Examples
///
/// ```
/// use shelf_server::cache::CacheKeys;
///
/// let keys = CacheKeys::new("shelf:bootstrap:");
/// assert_eq!(keys.bundle(), "shelf:bootstrap:data");
/// assert_eq!(keys.lock(), "shelf:bootstrap:lock");
/// assert_eq!(keys.version(), "shelf:bootstrap:version");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKeys {
    prefix: String,
    bundle: String,
    lock: String,
    version: String,
}

impl CacheKeys {
    /// Crea las keys a partir del prefijo. Los `:` sobrantes al final se ignoran.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim().trim_end_matches(':').to_string();
        Self {
            bundle: format!("{}:data", prefix),
            lock: format!("{}:lock", prefix),
            version: format!("{}:version", prefix),
            prefix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key del bundle completo.
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Key del lock de revalidacion.
    pub fn lock(&self) -> &str {
        &self.lock
    }

    /// Key del marcador de version que se incrementa al invalidar.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for CacheKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:*", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_share_prefix() {
        let keys = CacheKeys::new("catalog");
        assert_eq!(keys.prefix(), "catalog");
        assert_eq!(keys.bundle(), "catalog:data");
        assert_eq!(keys.lock(), "catalog:lock");
        assert_eq!(keys.version(), "catalog:version");
    }

    #[test]
    fn test_trailing_separator_trimmed() {
        assert_eq!(CacheKeys::new("a:b::"), CacheKeys::new("a:b"));
        assert_eq!(CacheKeys::new(" a ").bundle(), "a:data");
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKeys::new("shelf").to_string(), "shelf:*");
    }
}
