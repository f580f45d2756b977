//! Pin: out-of-band reference without the data lock
//! Pin：不持有数据锁的带外引用
//!
//! Used by a journal to keep a block resident between releases.
//! 供日志层在多次释放之间保持块常驻。

use crate::{BlockId, Cache};

/// Reference that keeps a block's slot from being recycled
/// 阻止块所在槽被回收的引用
#[must_use]
pub struct Pin<'a, D> {
  pub(crate) cache: &'a Cache<D>,
  pub(crate) idx: usize,
  pub(crate) id: BlockId,
}

impl<D> Pin<'_, D> {
  #[inline(always)]
  pub fn id(&self) -> BlockId {
    self.id
  }

  #[inline(always)]
  pub fn slot(&self) -> usize {
    self.idx
  }

  /// Drop the reference, same as drop
  /// 释放引用，等同于 drop
  #[inline]
  pub fn unpin(self) {}
}

impl<D> Drop for Pin<'_, D> {
  fn drop(&mut self) {
    self.cache.unref(self.idx, self.id, "unpin");
  }
}
