//! Test organization:
//! - retry_behavior.rs: attempts, retryable kinds and status filtering
//! - retry_backoff.rs: delays between attempts
//! - retry_config.rs: builder validation and defaults
//! - retry_stacked.rs: the retry layer stacked over a DAO

mod retry_behavior;
