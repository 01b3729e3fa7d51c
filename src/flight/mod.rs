//! Request Coalescing Module
//!
//! Deduplicates concurrent in-flight requests so that N simultaneous
//! callers for one key trigger exactly one upstream call.

mod coalescer;

pub use coalescer::RequestCoalescer;
