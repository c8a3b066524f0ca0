//! Router configuration.

/// How path variables that fail to parse are treated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Decoding {
    /// Substitute the zero value and call the method anyway.
    #[default]
    Lenient,
    /// Answer `400 Bad Request` without calling the method.
    Strict,
}

/// Options for [`Router::with_config`](crate::Router::with_config).
///
/// ```rust
/// use glass::{Config, Decoding};
///
/// let config = Config::default().decoding(Decoding::Strict);
/// # let _ = config;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub(crate) decoding: Decoding,
}

impl Config {
    pub fn decoding(mut self, decoding: Decoding) -> Self {
        self.decoding = decoding;
        self
    }
}
