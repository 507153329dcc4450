use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_a_source() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(io, Error::Io(_)));

        let json: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(json, Error::Json(_)));

        let invalid = crate::Options::default()
            .with_strength_multiplier(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(invalid, Error::InvalidOption(_)));
        assert!(invalid.to_string().starts_with("Invalid option: "));
    }
}
