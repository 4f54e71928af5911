pub type TweenkitResult<T> = Result<T, TweenkitError>;

#[derive(thiserror::Error, Debug)]
pub enum TweenkitError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("interpolation error: {0}")]
    Interpolation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("edit error: {0}")]
    Edit(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TweenkitError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn interpolation(msg: impl Into<String>) -> Self {
        Self::Interpolation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            TweenkitError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            TweenkitError::interpolation("x")
                .to_string()
                .contains("interpolation error:")
        );
        assert!(
            TweenkitError::parse("x")
                .to_string()
                .contains("parse error:")
        );
        assert!(TweenkitError::edit("x").to_string().contains("edit error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = TweenkitError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
