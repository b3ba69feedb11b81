//! # Constants
//!
//! Default values and literal names shared across the rotation crate.

/// Stage label carried by the version clients read today
pub const STAGE_CURRENT: &str = "AWSCURRENT";

/// Stage label carried by the version under rotation
pub const STAGE_PENDING: &str = "AWSPENDING";

/// Stage label the store attaches to the version that just lost `AWSCURRENT`
pub const STAGE_PREVIOUS: &str = "AWSPREVIOUS";

/// Required payload field checked by `testSecret` when nothing else is configured
pub const DEFAULT_REQUIRED_FIELD: &str = "apiVersion";

/// Payload field written by the default mutator with the rotation timestamp (unix seconds)
pub const LAST_ROTATED_FIELD: &str = "lastRotated";

/// Payload field written by the default mutator with the token prefix
pub const ROTATION_ID_FIELD: &str = "rotationId";

/// Number of token characters copied into `rotationId`
pub const ROTATION_ID_LEN: usize = 8;

/// Default AWS region when `AWS_REGION` is not set
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Default number of attempts per step when driving a full rotation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for retry backoff (milliseconds)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Default cap for retry backoff (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 10_000;

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "secret_rotation=info";
