//! Locked buffer handle
//! 已加锁的缓冲区句柄

use std::{
  fmt,
  mem::ManuallyDrop,
  ops::{Deref, DerefMut},
  sync::atomic::Ordering,
};

use parking_lot::MutexGuard;

use crate::{Block, BlockDev, BlockId, Cache, Result};

/// Exclusive access to one cached block.
///
/// Holds the slot's data lock and one reference. Dropping it releases both,
/// data lock first. Only one `Buf` per block exists at a time; other callers
/// block in `get`/`read` until it is released.
///
/// 对单个缓存块的独占访问。
///
/// 持有槽的数据锁和一个引用，Drop 时先释放数据锁再释放引用。
/// 同一块同时只存在一个 `Buf`，其他调用者在 `get`/`read` 中阻塞直到其释放。
#[must_use]
pub struct Buf<'a, D> {
  pub(crate) cache: &'a Cache<D>,
  pub(crate) idx: usize,
  pub(crate) id: BlockId,
  data: ManuallyDrop<MutexGuard<'a, Box<Block>>>,
}

impl<'a, D> Buf<'a, D> {
  pub(crate) fn new(
    cache: &'a Cache<D>,
    idx: usize,
    id: BlockId,
    data: MutexGuard<'a, Box<Block>>,
  ) -> Self {
    Self {
      cache,
      idx,
      id,
      data: ManuallyDrop::new(data),
    }
  }

  #[inline(always)]
  pub fn id(&self) -> BlockId {
    self.id
  }

  #[inline(always)]
  pub fn dev(&self) -> u32 {
    self.id.dev
  }

  #[inline(always)]
  pub fn blockno(&self) -> u32 {
    self.id.blockno
  }

  /// Pool slot index, stable while referenced
  /// 池中槽索引，被引用期间不变
  #[inline(always)]
  pub fn slot(&self) -> usize {
    self.idx
  }

  /// Data reflects the device
  /// 数据与设备一致
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.cache.slots[self.idx].valid.load(Ordering::Acquire)
  }

  pub(crate) fn set_valid(&self) {
    self.cache.slots[self.idx].valid.store(true, Ordering::Release);
  }

  /// Release lock and reference, same as drop
  /// 释放锁与引用，等同于 drop
  #[inline]
  pub fn release(self) {}
}

impl<D: BlockDev> Buf<'_, D> {
  /// Write data to the device
  /// 将数据写入设备
  #[inline]
  pub fn write(&self) -> Result<()> {
    self.cache.write(self)
  }
}

impl<D> Deref for Buf<'_, D> {
  type Target = [u8];

  #[inline(always)]
  fn deref(&self) -> &[u8] {
    &self.data[..]
  }
}

impl<D> DerefMut for Buf<'_, D> {
  #[inline(always)]
  fn deref_mut(&mut self) -> &mut [u8] {
    &mut self.data[..]
  }
}

impl<D> Drop for Buf<'_, D> {
  fn drop(&mut self) {
    // SAFETY: dropped exactly once, never touched again
    // 安全：只释放一次，之后不再访问
    unsafe { ManuallyDrop::drop(&mut self.data) };
    self.cache.unref(self.idx, self.id, "release");
  }
}

impl<D> fmt::Debug for Buf<'_, D> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Buf")
      .field("id", &self.id)
      .field("slot", &self.idx)
      .field("valid", &self.is_valid())
      .finish()
  }
}
