//! Buffer slot 缓冲槽

use std::sync::atomic::AtomicBool;

use parking_lot::Mutex;

use crate::{BSIZE, Block};

/// Fixed buffer in the pool. Identity and refcount live in the owning bucket.
/// 池中的固定缓冲区，标识与引用计数保存在所属桶中。
pub(crate) struct Slot {
  /// Data reflects the device. Cleared only under the bucket lock on a 0 -> 1
  /// reference transition, set only under `data`.
  /// 数据与设备一致。仅在桶锁下引用 0 -> 1 时清除，仅在持有 `data` 时置位。
  pub valid: AtomicBool,
  pub data: Mutex<Box<Block>>,
}

impl Slot {
  pub fn new() -> Self {
    Self {
      valid: AtomicBool::new(false),
      data: Mutex::new(Box::new([0; BSIZE])),
    }
  }
}
