use thiserror::Error;
use validator::ValidationErrors;

use open_wearables_data::repository::RepositoryError;

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input from the caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Map repository errors to service errors
pub fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Validation(msg) => ServiceError::Validation(msg),
        _ => ServiceError::Repository(err.to_string()),
    }
}

/// Flatten validator field errors into one readable message
pub fn format_validation_errors(validation_errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();
    // HashMap iteration order is unstable
    fields.sort();
    fields.join("; ")
}
