use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Underlying MongoDB driver failure.
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// The engine connection was released via dispose and is never
    /// re-established.
    #[error("database connection has been disposed")]
    Disposed,
}
