//! Height-map terrain generation.
//!
//! A grayscale image is read as terrain height: each pixel's brightness is
//! the height of the column above it. The image plane lies on x (columns)
//! and z (rows); brightness maps onto y.
//!
//! The build recursively splits an image region into 8 sub-regions, halving
//! the column range, the row range and the brightness range. When the depth
//! budget runs out, or the region cannot be halved any more, it becomes a
//! leaf: solid if the region's mean brightness is above the middle of its
//! brightness range, air otherwise.
//!
//! ```text
//!   brightness (y)
//!   255 ┌──────────┐
//!       │ upper    │  octants with bit 1 set
//!   127 ├──────────┤
//!       │ lower    │  octants with bit 1 clear
//!     0 └──────────┘
//!        columns (x)
//! ```
//!
//! Siblings that all come out as leaves of one type are collapsed back into
//! their parent while building. No observer exists yet, so nothing is
//! reported.

use rayon::prelude::*;

use crate::constants::{OCTANT_COUNT, PARALLEL_BUILD_DEPTH};
use crate::error::{Result, SvoError};
use crate::octree::Node;
use crate::types::VoxelType;

/// Row-major grayscale image.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
  width: u32,
  height: u32,
  samples: Vec<u8>,
  fill: VoxelType,
}

impl HeightMap {
  /// Wrap `samples` (row-major, `width * height` bytes).
  pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
    if width == 0 || height == 0 || samples.len() != width as usize * height as usize {
      return Err(SvoError::InvalidHeightMap {
        width,
        height,
        actual: samples.len(),
      });
    }
    Ok(Self {
      width,
      height,
      samples,
      fill: VoxelType(1),
    })
  }

  /// Uniform image.
  pub fn flat(width: u32, height: u32, value: u8) -> Result<Self> {
    Self::new(width, height, vec![value; width as usize * height as usize])
  }

  /// Voxel type for solid leaves (default `1`).
  pub fn with_fill(mut self, fill: impl Into<VoxelType>) -> Self {
    self.fill = fill.into();
    self
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  #[inline]
  pub fn fill(&self) -> VoxelType {
    self.fill
  }

  #[inline]
  pub fn sample(&self, column: u32, row: u32) -> u8 {
    self.samples[(row * self.width + column) as usize]
  }

  fn full_region(&self) -> Region<'_> {
    Region {
      map: self,
      columns: (0, self.width),
      rows: (0, self.height),
      brightness: (0, u8::MAX),
    }
  }
}

/// Build the node tree for `map`, at most `depth` levels deep.
pub fn generate(map: &HeightMap, depth: usize) -> Node {
  build(&map.full_region(), depth)
}

/// Rectangle of the image together with a brightness band.
#[derive(Clone, Copy, Debug)]
struct Region<'a> {
  map: &'a HeightMap,
  /// Half-open column range.
  columns: (u32, u32),
  /// Half-open row range.
  rows: (u32, u32),
  /// Brightness band `[lo, hi]`.
  brightness: (u8, u8),
}

impl Region<'_> {
  /// Sub-region for each octant, None once any axis is down to one unit.
  fn octants(&self) -> Option<[Self; OCTANT_COUNT]> {
    let columns = halve(self.columns)?;
    let rows = halve(self.rows)?;
    let (lo, hi) = self.brightness;
    let half_range = (hi - lo) / 2;
    if half_range == 0 {
      return None;
    }
    let brightness = [(lo, lo + half_range), (lo + half_range, hi)];

    Some(std::array::from_fn(|octant| Self {
      map: self.map,
      columns: columns[octant & 1],
      brightness: brightness[(octant >> 1) & 1],
      rows: rows[(octant >> 2) & 1],
    }))
  }

  fn mean_brightness(&self) -> u8 {
    let (x0, xn) = self.columns;
    let (y0, yn) = self.rows;
    let sum: u64 = (y0..yn)
      .flat_map(|row| (x0..xn).map(move |column| self.map.sample(column, row) as u64))
      .sum();
    let count = (xn - x0) as u64 * (yn - y0) as u64;
    (sum / count) as u8
  }

  fn is_solid(&self) -> bool {
    let (lo, hi) = self.brightness;
    self.mean_brightness() > lo + (hi - lo) / 2
  }
}

fn halve((start, end): (u32, u32)) -> Option<[(u32, u32); 2]> {
  let half = (end - start) / 2;
  (half != 0).then(|| [(start, start + half), (start + half, end)])
}

fn build(region: &Region<'_>, depth: usize) -> Node {
  let octants = match region.octants() {
    Some(octants) if depth > 0 => octants,
    _ => {
      let voxel = if region.is_solid() { region.map.fill } else { VoxelType::AIR };
      return Node::leaf(voxel);
    }
  };

  let mut children: [Node; OCTANT_COUNT] = std::array::from_fn(|_| Node::leaf(VoxelType::AIR));
  if depth >= PARALLEL_BUILD_DEPTH {
    children
      .par_iter_mut()
      .zip(octants.par_iter())
      .for_each(|(child, octant)| *child = build(octant, depth - 1));
  } else {
    for (child, octant) in children.iter_mut().zip(octants.iter()) {
      *child = build(octant, depth - 1);
    }
  }
  collapse_uniform(children)
}

/// Single leaf if every child is a leaf of the same type.
fn collapse_uniform(children: [Node; OCTANT_COUNT]) -> Node {
  let first = children[0].voxel();
  if first.is_some() && children.iter().all(|child| child.voxel() == first) {
    Node::leaf(first.unwrap_or_default())
  } else {
    Node::Branch(Box::new(children))
  }
}

#[cfg(test)]
#[path = "height_map_test.rs"]
mod height_map_test;
