pub type SceneResult<T> = Result<T, SceneError>;

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("frame load error: {0}")]
    Load(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(SceneError::config("x").to_string().starts_with("config error:"));
        assert!(SceneError::load("x").to_string().starts_with("frame load error:"));
    }

    #[test]
    fn io_errors_convert_transparently() {
        let err: SceneError = std::io::Error::other("disk gone").into();
        assert_eq!(err.to_string(), "disk gone");
    }
}
