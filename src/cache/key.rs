//! Logical Cache Keys
//!
//! An empty or absent key is a sentinel meaning "skip the store".

/// A caller supplied logical key.
pub trait CacheKey {
    /// The key text, or `None` for the empty/absent sentinel.
    fn as_key(&self) -> Option<&str>;
}

impl CacheKey for str {
    fn as_key(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self)
    }
}

impl CacheKey for String {
    fn as_key(&self) -> Option<&str> {
        self.as_str().as_key()
    }
}

impl<K: CacheKey + ?Sized> CacheKey for &K {
    fn as_key(&self) -> Option<&str> {
        (**self).as_key()
    }
}

impl<K: CacheKey> CacheKey for Option<K> {
    fn as_key(&self) -> Option<&str> {
        self.as_ref().and_then(CacheKey::as_key)
    }
}
