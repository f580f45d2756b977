//! Cache statistics 缓存统计

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Live counters 运行时计数器
#[derive(Default)]
pub(crate) struct Counter {
  pub hit: AtomicU64,
  pub recycle: AtomicU64,
  pub steal: AtomicU64,
  pub no_buf: AtomicU64,
  pub read: AtomicU64,
  pub write: AtomicU64,
}

#[inline(always)]
pub(crate) fn inc(c: &AtomicU64) {
  c.fetch_add(1, Relaxed);
}

impl Counter {
  pub fn snapshot(&self) -> Stat {
    Stat {
      hit: self.hit.load(Relaxed),
      recycle: self.recycle.load(Relaxed),
      steal: self.steal.load(Relaxed),
      no_buf: self.no_buf.load(Relaxed),
      read: self.read.load(Relaxed),
      write: self.write.load(Relaxed),
    }
  }
}

/// Counter snapshot
/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
  /// Lookups served by a cached identity 命中已缓存标识的查找
  pub hit: u64,
  /// Misses served from the home bucket 由本桶满足的未命中
  pub recycle: u64,
  /// Misses served from another bucket 由其他桶满足的未命中
  pub steal: u64,
  /// Lookups that found no free buffer 找不到空闲缓冲区的查找
  pub no_buf: u64,
  /// Device reads 设备读
  pub read: u64,
  /// Device writes 设备写
  pub write: u64,
}

/// Bucket snapshot
/// 桶快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketStat {
  /// Member slot indices, oldest first 成员槽索引，从旧到新
  pub slots: Vec<usize>,
  /// Free-count hint 空闲计数提示
  pub hint: usize,
  /// Actual members with no reference 实际无引用成员数
  pub free: usize,
}
