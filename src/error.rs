use thiserror::Error;

/// `(rows, cols)` of a matrix operand.
pub type Shape = (usize, usize);

pub type Result<T> = std::result::Result<T, MlpError>;

/// Everything that can go wrong in the toolkit.
///
/// Note that NaN and infinite values are *not* errors by default: the matrix
/// engine clamps them silently (see [`crate::math::numeric`]). `NonFinite` is
/// only produced when a network runs in [`crate::math::Numerics::Strict`] mode.
#[derive(Error, Debug)]
pub enum MlpError {
    /// Operand or layer dimensions do not line up.
    #[error("{op} shape mismatch: {left:?} and {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: Shape,
        right: Shape,
    },

    /// A call argument is unusable (bad batch size, mismatched sample counts, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Strict numerics only: an operation produced NaN or an infinity.
    #[error("{op} produced a non-finite value")]
    NonFinite { op: &'static str },

    /// A deserialized model violates the network invariants.
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MlpError {
    pub(crate) fn shape(op: &'static str, left: Shape, right: Shape) -> Self {
        MlpError::ShapeMismatch { op, left, right }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MlpError::InvalidArgument(msg.into())
    }
}
