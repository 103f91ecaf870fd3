//! Tables of the studio app we write to.
pub mod resources;
