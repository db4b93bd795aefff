//! Algorithms on top of the mesh topology.
//!
//! - **Integration**: seamless integration setup for directional fields
//! - **Sparse**: triplet-built CSR matrices used by the assembled operators
//! - **Progress**: callbacks for long-running setup calls

pub mod integration;
pub mod progress;
pub mod sparse;

pub use progress::Progress;
