//! Procedural tree construction.
//!
//! - [`height_map`]: solid terrain from a grayscale height image

pub mod height_map;

pub use height_map::HeightMap;
