//! Bucket: one lock partition of the pool
//! 桶：缓冲池的一个锁分区
//!
//! Members are kept oldest-first. A reassigned member moves to the tail, so the
//! first free member found by a scan is the one assigned longest ago.
//! 成员按从旧到新排列。重新分配的成员移到末尾，扫描找到的第一个空闲成员即最早分配者。

use crate::BlockId;

/// Membership record of one slot
/// 单个槽的成员记录
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
  pub idx: usize,
  /// None until first assigned 首次分配前为 None
  pub id: Option<BlockId>,
  pub refcnt: u32,
}

#[derive(Debug, Default)]
pub(crate) struct Bucket {
  pub li: Vec<Entry>,
  /// Members with refcnt 0 引用为 0 的成员数
  pub free: usize,
}

impl Bucket {
  /// Bucket owning slots `0..n`, all free
  /// 拥有槽 `0..n` 且全部空闲的桶
  pub fn with_slots(n: usize) -> Self {
    Self {
      li: (0..n)
        .map(|idx| Entry {
          idx,
          id: None,
          refcnt: 0,
        })
        .collect(),
      free: n,
    }
  }

  /// Take a reference on a cached block
  /// 命中已缓存块并增加引用
  pub fn hit(&mut self, id: BlockId) -> Option<usize> {
    let e = self.li.iter_mut().find(|e| e.id == Some(id))?;
    if e.refcnt == 0 {
      self.free -= 1;
    }
    e.refcnt += 1;
    Some(e.idx)
  }

  /// Reassign a free member in place
  /// 原地重新分配一个空闲成员
  pub fn recycle(&mut self, id: BlockId) -> Option<usize> {
    let e = self.take_free()?;
    Some(self.adopt(e, id))
  }

  /// Unlink the oldest free member
  /// 摘下最早的空闲成员
  pub fn take_free(&mut self) -> Option<Entry> {
    if self.free == 0 {
      return None;
    }
    let pos = self.li.iter().position(|e| e.refcnt == 0)?;
    self.free -= 1;
    Some(self.li.remove(pos))
  }

  /// Link an unlinked member under a new identity with one reference
  /// 以新标识和一个引用挂入已摘下的成员
  pub fn adopt(&mut self, mut e: Entry, id: BlockId) -> usize {
    e.id = Some(id);
    e.refcnt = 1;
    self.li.push(e);
    e.idx
  }

  /// Add a reference to a referenced member
  /// 为已被引用的成员增加引用
  pub fn pin(&mut self, idx: usize) -> bool {
    match self.li.iter_mut().find(|e| e.idx == idx && e.refcnt > 0) {
      Some(e) => {
        e.refcnt += 1;
        true
      }
      None => false,
    }
  }

  /// Drop a reference, returns the count left
  /// 释放一个引用，返回剩余计数
  pub fn unref(&mut self, idx: usize) -> Option<u32> {
    let e = self.li.iter_mut().find(|e| e.idx == idx && e.refcnt > 0)?;
    e.refcnt -= 1;
    if e.refcnt == 0 {
      self.free += 1;
    }
    Some(e.refcnt)
  }

  /// Actual count of free members
  /// 实际空闲成员数
  pub fn count_free(&self) -> usize {
    self.li.iter().filter(|e| e.refcnt == 0).count()
  }
}
