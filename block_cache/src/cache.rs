//! Partitioned buffer cache
//! 分桶缓冲区缓存
//!
//! Two lock levels:
//! - bucket lock: membership, identity, refcount, free hint. Never held across
//!   device I/O or a data-lock wait.
//! - slot data lock: block contents, held by one `Buf` at a time.
//!
//! A block lives in bucket `blockno % nbucket`. On a miss with no free member
//! at home, a free member is moved over from another bucket (steal). A steal
//! locks the two buckets in index order, so concurrent steals cannot deadlock.
//!
//! 两级锁：
//! - 桶锁：成员、标识、引用计数、空闲提示。设备 I/O 和等待数据锁时绝不持有。
//! - 槽数据锁：块内容，同一时刻仅一个 `Buf` 持有。
//!
//! 块位于桶 `blockno % nbucket`。未命中且本桶无空闲成员时，从其他桶迁入一个空闲成员（窃取）。
//! 窃取按桶索引顺序加锁两个桶，并发窃取不会死锁。

use std::sync::atomic::Ordering;

use log::{debug, error, trace, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::{
  BlockDev, BlockId, Buf, Conf, Error, ParsedConf, Pin, Result,
  bucket::Bucket,
  slot::Slot,
  stat::{BucketStat, Counter, Stat, inc},
};

type Guard<'a> = MutexGuard<'a, Bucket>;

pub struct Cache<D> {
  dev: D,
  buckets: Box<[Mutex<Bucket>]>,
  pub(crate) slots: Box<[Slot]>,
  counter: Counter,
}

impl<D> Cache<D> {
  /// Build the pool; every buffer starts free in bucket 0
  /// 建立缓冲池，所有缓冲区初始空闲且位于桶 0
  pub fn new(dev: D, conf: &[Conf]) -> Self {
    let ParsedConf { nbuf, nbucket } = ParsedConf::new(conf);
    let buckets = (0..nbucket)
      .map(|i| {
        Mutex::new(if i == 0 {
          Bucket::with_slots(nbuf)
        } else {
          Bucket::default()
        })
      })
      .collect();
    let slots = (0..nbuf).map(|_| Slot::new()).collect();
    debug!("block cache: {nbuf} buffers, {nbucket} buckets");
    Self {
      dev,
      buckets,
      slots,
      counter: Counter::default(),
    }
  }

  /// Buffer count 缓冲区数量
  #[inline(always)]
  pub fn cap(&self) -> usize {
    self.slots.len()
  }

  /// Bucket count 桶数量
  #[inline(always)]
  pub fn nbucket(&self) -> usize {
    self.buckets.len()
  }

  /// Bucket a block number routes to
  /// 块号对应的桶
  #[inline(always)]
  pub fn bucket_of(&self, blockno: u32) -> usize {
    blockno as usize % self.buckets.len()
  }

  #[inline(always)]
  pub fn dev(&self) -> &D {
    &self.dev
  }

  pub fn stat(&self) -> Stat {
    self.counter.snapshot()
  }

  /// Per-bucket snapshot, taken one bucket at a time
  /// 逐个桶获取的快照
  pub fn buckets(&self) -> Vec<BucketStat> {
    self
      .buckets
      .iter()
      .map(|b| {
        let b = b.lock();
        BucketStat {
          slots: b.li.iter().map(|e| e.idx).collect(),
          hint: b.free,
          free: b.count_free(),
        }
      })
      .collect()
  }

  /// Find or assign a slot for `id` with one reference taken.
  /// Returns the slot index.
  /// 查找或分配 `id` 的槽并持有一个引用，返回槽索引。
  fn lookup(&self, id: BlockId) -> Result<usize> {
    let home = self.bucket_of(id.blockno);
    {
      let mut b = self.buckets[home].lock();
      if let Some(idx) = self.local(&mut b, id) {
        return Ok(idx);
      }
    }
    self.steal(home, id)
  }

  /// Hit or in-place recycle within a locked home bucket
  /// 在已加锁的本桶内命中或原地回收
  fn local(&self, b: &mut Bucket, id: BlockId) -> Option<usize> {
    if let Some(idx) = b.hit(id) {
      inc(&self.counter.hit);
      trace!("hit {id} slot {idx}");
      return Some(idx);
    }
    let idx = b.recycle(id)?;
    self.slots[idx].valid.store(false, Ordering::Release);
    inc(&self.counter.recycle);
    trace!("recycle slot {idx} for {id}");
    Some(idx)
  }

  /// Move a free member of another bucket into `home`.
  ///
  /// Candidates are visited round-robin from `home + 1`. Each pair is locked
  /// lower index first. Home was unlocked in between, so it is re-checked
  /// under the pair before taking from the candidate.
  ///
  /// 将其他桶的空闲成员迁入 `home`。
  ///
  /// 从 `home + 1` 起轮转访问候选桶，每对桶先锁索引较小者。
  /// 本桶期间曾解锁，因此在从候选桶取出前先在双锁下复查本桶。
  fn steal(&self, home: usize, id: BlockId) -> Result<usize> {
    let n = self.buckets.len();
    for off in 1..n {
      let victim = (home + off) % n;
      let (mut h, mut v) = self.lock_pair(home, victim);
      if let Some(idx) = self.local(&mut h, id) {
        return Ok(idx);
      }
      let Some(e) = v.take_free() else {
        continue;
      };
      let idx = h.adopt(e, id);
      self.slots[idx].valid.store(false, Ordering::Release);
      drop(v);
      drop(h);
      inc(&self.counter.steal);
      debug!("steal slot {idx} from bucket {victim} to {home} for {id}");
      return Ok(idx);
    }
    inc(&self.counter.no_buf);
    warn!("no free buffer for {id}, {} in use", self.cap());
    Err(Error::NoBuf)
  }

  /// Lock buckets `home` and `victim` in index order, return (home, victim)
  /// 按索引顺序锁住 `home` 与 `victim`，返回 (home, victim)
  fn lock_pair(&self, home: usize, victim: usize) -> (Guard<'_>, Guard<'_>) {
    if home < victim {
      let h = self.buckets[home].lock();
      let v = self.buckets[victim].lock();
      (h, v)
    } else {
      let v = self.buckets[victim].lock();
      let h = self.buckets[home].lock();
      (h, v)
    }
  }

  /// Acquire a locked buffer for (dev, blockno).
  ///
  /// Blocks while another holder has the block. A freshly assigned buffer is
  /// invalid: its contents are stale until loaded or overwritten.
  ///
  /// 获取 (dev, blockno) 的已加锁缓冲区。
  ///
  /// 其他持有者持有该块时阻塞。新分配的缓冲区无效，加载或覆盖前内容过期。
  pub fn get(&self, dev: u32, blockno: u32) -> Result<Buf<'_, D>> {
    let id = BlockId::new(dev, blockno);
    let idx = self.lookup(id)?;
    Ok(Buf::new(self, idx, id, self.slots[idx].data.lock()))
  }

  /// Take an extra reference on a held buffer
  /// 为持有的缓冲区增加一个额外引用
  ///
  /// # Panics
  /// If `buf` belongs to another cache.
  pub fn pin<'a>(&'a self, buf: &Buf<'a, D>) -> Pin<'a, D> {
    assert!(std::ptr::eq(buf.cache, self), "pin: buffer from another cache");
    let ok = self.buckets[self.bucket_of(buf.id.blockno)]
      .lock()
      .pin(buf.idx);
    assert!(ok, "pin: {} not referenced", buf.id);
    Pin {
      cache: self,
      idx: buf.idx,
      id: buf.id,
    }
  }

  /// Same as `pin.unpin()` 等同于 `pin.unpin()`
  #[inline]
  pub fn unpin(&self, pin: Pin<'_, D>) {
    assert!(std::ptr::eq(pin.cache, self), "unpin: pin from another cache");
    drop(pin);
  }

  /// Same as `buf.release()` 等同于 `buf.release()`
  #[inline]
  pub fn release(&self, buf: Buf<'_, D>) {
    assert!(std::ptr::eq(buf.cache, self), "release: buffer from another cache");
    drop(buf);
  }

  /// Drop one reference; a member reaching zero becomes a reuse candidate
  /// 释放一个引用，归零的成员成为可复用候选
  pub(crate) fn unref(&self, idx: usize, id: BlockId, op: &str) {
    let left = self.buckets[self.bucket_of(id.blockno)].lock().unref(idx);
    match left {
      Some(0) => trace!("{op} {id}, slot {idx} free"),
      Some(_) => {}
      None => panic!("{op}: {id} slot {idx} not referenced"),
    }
  }
}

impl<D: BlockDev> Cache<D> {
  /// Acquire a locked buffer holding the device contents of (dev, blockno)
  /// 获取内容与设备一致的 (dev, blockno) 已加锁缓冲区
  pub fn read(&self, dev: u32, blockno: u32) -> Result<Buf<'_, D>> {
    let mut buf = self.get(dev, blockno)?;
    if !buf.is_valid() {
      inc(&self.counter.read);
      if let Err(e) = self.dev.read_block(dev, blockno, &mut buf) {
        error!("read {}: {e}", buf.id);
        return Err(e.into());
      }
      buf.set_valid();
    }
    Ok(buf)
  }

  /// Write a held buffer to the device. Refcount and validity unchanged.
  /// 将持有的缓冲区写入设备，不改变引用计数与有效位。
  ///
  /// # Panics
  /// If `buf` belongs to another cache.
  pub fn write(&self, buf: &Buf<'_, D>) -> Result<()> {
    assert!(std::ptr::eq(buf.cache, self), "write: buffer from another cache");
    inc(&self.counter.write);
    if let Err(e) = self.dev.write_block(buf.id.dev, buf.id.blockno, buf) {
      error!("write {}: {e}", buf.id);
      return Err(e.into());
    }
    Ok(())
  }
}
