/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `lock_timeout_ms` is read
/// from `LOCK_TIMEOUT_MS`, and so on. Use `#[serde(default = ...)]` for
/// optional settings.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit list of key/value pairs instead of the process
    /// environment. Keys use the same upper-case names as `from_env`.
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
