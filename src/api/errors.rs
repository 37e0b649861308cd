use crate::utils::{FormError, StorageError, ValidationError};

#[derive(Responder, Debug)]
pub enum Error {
    #[response(status = 400)]
    BadRequest(String),
    #[response(status = 401)]
    Unauthorized(String),
    #[response(status = 404)]
    NotFound(String),
    #[response(status = 409)]
    Conflict(String),
    #[response(status = 500)]
    InternalServer(String),
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::BadRequest(e.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::InternalServer(e.to_string())
    }
}

impl From<FormError> for Error {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Busy => Error::Conflict(e.to_string()),
            FormError::Validation(e) => e.into(),
            FormError::Auth(e) => Error::Unauthorized(e.to_string()),
            FormError::Storage(e) => e.into(),
        }
    }
}
