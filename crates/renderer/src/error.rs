use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid raster size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Bounding box has no area: {0}")]
    EmptyBounds(String),

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}
