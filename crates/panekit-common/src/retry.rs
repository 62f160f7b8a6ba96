//! Retry policy for the graphics-device recreation path.
//!
//! Painting is synchronous; the only retry loop in the toolkit sits around a
//! paint pass whose backend reported device loss. Between attempts the caller
//! recreates its device resources. Style caches are never touched here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 = no retries).
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryConfig {
    /// Create a config for no retries.
    pub fn none() -> Self {
        Self { max_attempts: 1 }
    }
}

/// Run `operation`, recreating resources and trying again whenever it fails
/// with a retryable error.
///
/// Non-retryable errors are returned immediately. After the last attempt the
/// last error is returned.
pub fn retry_on_device_loss<T, F, R>(
    config: &RetryConfig,
    mut operation: F,
    mut recreate: R,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
    R: FnMut(),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Paint succeeded after resource recreation");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Recreating device resources");
                recreate();
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaneKitError;

    #[test]
    fn test_retry_config_default() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
        assert_eq!(RetryConfig::none().max_attempts, 1);
    }

    #[test]
    fn test_success_first_attempt() {
        let mut recreated = 0;
        let result = retry_on_device_loss(&RetryConfig::default(), || Ok(42), || recreated += 1);
        assert_eq!(result.unwrap(), 42);
        assert_eq!(recreated, 0);
    }

    #[test]
    fn test_success_after_device_loss() {
        let mut attempts = 0;
        let mut recreated = 0;
        let result = retry_on_device_loss(
            &RetryConfig::default(),
            || {
                attempts += 1;
                if attempts < 3 {
                    Err(PaneKitError::DeviceLost)
                } else {
                    Ok("painted")
                }
            },
            || recreated += 1,
        );
        assert_eq!(result.unwrap(), "painted");
        assert_eq!(attempts, 3);
        assert_eq!(recreated, 2);
    }

    #[test]
    fn test_non_retryable_error_returns_immediately() {
        let mut attempts = 0;
        let result: Result<()> = retry_on_device_loss(
            &RetryConfig::default(),
            || {
                attempts += 1;
                Err(PaneKitError::paint("bad brush"))
            },
            || {},
        );
        assert!(matches!(result, Err(PaneKitError::Paint { .. })));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut attempts = 0;
        let result: Result<()> = retry_on_device_loss(
            &RetryConfig { max_attempts: 2 },
            || {
                attempts += 1;
                Err(PaneKitError::DeviceLost)
            },
            || {},
        );
        assert!(matches!(result, Err(PaneKitError::DeviceLost)));
        assert_eq!(attempts, 2);
    }
}
