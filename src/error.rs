pub type PosterResult<T> = Result<T, PosterError>;

/// Failures of the figure-to-pixels path. Composition itself cannot fail.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    #[error("raster error: {0}")]
    Raster(String),

    #[error("svg error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),
}

impl PosterError {
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(PosterError::raster("x").to_string().contains("raster error:"));
        assert!(
            PosterError::Svg(usvg::Error::ElementsLimitReached)
                .to_string()
                .contains("svg error:")
        );
    }
}
