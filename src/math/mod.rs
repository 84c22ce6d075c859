//! Math primitives shared by collision and rendering
//!
//! # Module Organization
//!
//! - `tables` - Precomputed sin/cos lookup and the bit-trick sqrt table
//! - `vec` - Vec3/Vec2 value types
//! - `mat` - 3x3 rotation matrices

pub mod mat;
pub mod tables;
pub mod vec;

pub use mat::Mat33;
pub use tables::{MathTables, TRIG_TABLE_SIZE};
pub use vec::{Vec2, Vec3};
