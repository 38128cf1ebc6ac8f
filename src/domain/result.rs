//! Result type alias for orderflow

use super::errors::OrderflowError;

/// Result type alias for orderflow operations
///
/// # Examples
///
/// ```
/// use orderflow::domain::result::Result;
/// use orderflow::domain::errors::OrderflowError;
///
/// fn failing_function() -> Result<()> {
///     Err(OrderflowError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, OrderflowError>;
