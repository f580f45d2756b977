//! In-memory block device
//! 内存块设备
//!
//! Unwritten blocks read as zeros. Counts transfers and can inject failures.
//! 未写过的块读出全零。统计传输次数，可注入故障。

use std::{
  collections::{HashMap, HashSet},
  io,
  sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use super::BlockDev;
use crate::{BSIZE, BlockId};

#[derive(Default)]
pub struct MemDev {
  blocks: Mutex<HashMap<BlockId, Box<[u8]>>>,
  fail: Mutex<HashSet<BlockId>>,
  reads: AtomicU64,
  writes: AtomicU64,
}

impl MemDev {
  pub fn new() -> Self {
    Self::default()
  }

  /// Device reads so far / 已发生的读次数
  #[inline]
  pub fn reads(&self) -> u64 {
    self.reads.load(Ordering::Relaxed)
  }

  /// Device writes so far / 已发生的写次数
  #[inline]
  pub fn writes(&self) -> u64 {
    self.writes.load(Ordering::Relaxed)
  }

  /// Stored image of a block / 块的已存储内容
  pub fn peek(&self, dev: u32, blockno: u32) -> Option<Box<[u8]>> {
    self.blocks.lock().get(&BlockId::new(dev, blockno)).cloned()
  }

  /// Seed a block without counting a write
  /// 预置块内容，不计入写次数
  pub fn put(&self, dev: u32, blockno: u32, data: &[u8]) {
    let mut img = vec![0u8; BSIZE].into_boxed_slice();
    let n = data.len().min(BSIZE);
    img[..n].copy_from_slice(&data[..n]);
    self.blocks.lock().insert(BlockId::new(dev, blockno), img);
  }

  /// Make every transfer of this block fail
  /// 令该块的所有传输失败
  pub fn fail(&self, dev: u32, blockno: u32) {
    self.fail.lock().insert(BlockId::new(dev, blockno));
  }

  /// Undo `fail` / 撤销 `fail`
  pub fn heal(&self, dev: u32, blockno: u32) {
    self.fail.lock().remove(&BlockId::new(dev, blockno));
  }

  fn check(&self, id: BlockId) -> io::Result<()> {
    if self.fail.lock().contains(&id) {
      return Err(io::Error::other(format!("injected failure at {id}")));
    }
    Ok(())
  }
}

impl BlockDev for MemDev {
  fn read_block(&self, dev: u32, blockno: u32, buf: &mut [u8]) -> io::Result<()> {
    let id = BlockId::new(dev, blockno);
    self.check(id)?;
    self.reads.fetch_add(1, Ordering::Relaxed);
    match self.blocks.lock().get(&id) {
      Some(img) => {
        let n = img.len().min(buf.len());
        buf[..n].copy_from_slice(&img[..n]);
        buf[n..].fill(0);
      }
      None => buf.fill(0),
    }
    Ok(())
  }

  fn write_block(&self, dev: u32, blockno: u32, buf: &[u8]) -> io::Result<()> {
    let id = BlockId::new(dev, blockno);
    self.check(id)?;
    self.writes.fetch_add(1, Ordering::Relaxed);
    self.blocks.lock().insert(id, buf.into());
    Ok(())
  }
}
