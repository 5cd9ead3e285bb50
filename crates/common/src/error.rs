use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("customer not found")]
    CustomerNotFound,

    #[error("staff not found")]
    StaffNotFound,

    #[error("service not found")]
    ServiceNotFound,

    #[error("appointment not found")]
    AppointmentNotFound,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid time")]
    InvalidTime,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("conflicting appointment booking")]
    ConflictingBooking,

    #[error("name cannot be empty")]
    InvalidName,

    #[error("email cannot be empty")]
    InvalidEmail,

    #[error("price must be greater than zero")]
    InvalidPrice,

    #[error("role cannot be empty")]
    InvalidRole,

    #[error("record already exists: {0}")]
    AlreadyExists(String),

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl Error {
    /// True for errors caused by an id that does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::CustomerNotFound
                | Error::StaffNotFound
                | Error::ServiceNotFound
                | Error::AppointmentNotFound
        )
    }

    /// True for structurally invalid caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidDate
                | Error::InvalidTime
                | Error::InvalidStatus(_)
                | Error::InvalidName
                | Error::InvalidEmail
                | Error::InvalidPrice
                | Error::InvalidRole
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn storage_error_keeps_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err: Error = inner.context("failed to find appointment").unwrap_err().into();

        assert!(matches!(err, Error::Storage(_)));
        let message = err.to_string();
        assert!(message.contains("failed to find appointment"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn categories_do_not_overlap() {
        assert!(Error::StaffNotFound.is_not_found());
        assert!(!Error::StaffNotFound.is_validation());
        assert!(Error::InvalidStatus("bogus".into()).is_validation());
        assert!(!Error::ConflictingBooking.is_not_found());
        assert!(!Error::ConflictingBooking.is_validation());
    }
}
