/*!
 * Translation of cleaned subtitle tracks.
 *
 * - `batch`: Batched submission, segment pairing and right-to-left wrapping
 * - `throttle`: Inter-batch pacing and retry backoff policies
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, DEFAULT_BATCH_SIZE};
pub use self::throttle::{BackoffPolicy, ExponentialBackoff, NoDelay};

// Submodules
pub mod batch;
pub mod throttle;
