// ## 📂 File: `src/queue/mod.rs`

//! Queue pairs: ingress ring, private accelerator, scratch digests and the
//! dequeue loop.
//!
//! Design notes:
//! - One queue pair per processing context. Nothing mutable is shared with
//!   other queue pairs except the session-less pool, which is lock-free.
//! - Sessions are read-only once compiled; a queue pair that did not
//!   compile a session registers its own copy through `TemplateCache`.

pub mod cache;
mod dequeue;
pub mod qp;
pub mod scratch;

pub use cache::TemplateCache;
pub use qp::QueuePair;
pub use scratch::DigestScratchRing;
