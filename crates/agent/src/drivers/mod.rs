//! Thin callers of the loop: batch tasks from a file, or one streamed task.

pub mod batch;
pub mod stream;

pub use batch::{BatchError, BatchFile, BatchSummary, BatchTask, run_batch};
pub use stream::{InputError, read_prompt, run_stream};
