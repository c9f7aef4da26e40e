use thiserror::Error;

/// Error type for lora-mapper operations.
#[derive(Debug, Error, PartialEq)]
pub enum MapperError {
    /// A coordinate is negative, non-finite or could not be parsed.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    /// A data rate string is not of the form `SF<n>BW<n>`.
    #[error("Invalid data rate: {0}")]
    InvalidDataRate(String),
    /// CSV parsing or reading error.
    #[error("CSV error: {0}")]
    Csv(String),
    /// File I/O or serialization error.
    #[error("IO error: {0}")]
    Io(String),
    /// Configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The store rejected a query or returned an unreadable response.
    #[error("Query error: {0}")]
    Query(String),
    /// Failed to build or encode GeoJSON.
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
    /// The HTTP listener failed.
    #[error("Server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = MapperError::Query("database not found: lora".to_string());
        assert_eq!(err.to_string(), "Query error: database not found: lora");
    }

    #[test]
    fn test_invalid_coordinate_display() {
        let err = MapperError::InvalidCoordinate("-1.5".to_string());
        assert_eq!(err.to_string(), "Invalid coordinate: -1.5");
    }
}
