use crate::{
    draft::PersistenceError, encode::EncodeError, path::ShapeError, serialize::SerializeError,
    session::SubmitError, tree::TreeError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level aggregation. Validation outcomes are values, never errors;
/// everything here is either a programmer error (shape, tree), an
/// infrastructure failure (serialize, persistence), or a submission
/// failure already converted to feedback by the session.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
