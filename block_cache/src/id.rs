//! Block identity 块标识

use std::fmt;

/// (device, block number) pair
/// （设备号，块号）对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
  pub dev: u32,
  pub blockno: u32,
}

impl BlockId {
  #[inline(always)]
  pub const fn new(dev: u32, blockno: u32) -> Self {
    Self { dev, blockno }
  }
}

impl fmt::Display for BlockId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.dev, self.blockno)
  }
}
