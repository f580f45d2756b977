//! Block device interface
//! 块设备接口
//!
//! The cache calls the device synchronously, without any bucket lock held.
//! 缓存同步调用设备，调用时不持有任何桶锁。

use std::{io, sync::Arc};

#[cfg(all(feature = "file", unix))]
pub mod file;
#[cfg(feature = "mem")]
pub mod mem;

/// Synchronous block transfer
/// 同步块传输
///
/// `buf` is always `BSIZE` bytes. Return only on completion or error.
/// `buf` 长度恒为 `BSIZE`，完成或出错后才返回。
pub trait BlockDev: Send + Sync {
  /// Fill `buf` from the device
  /// 从设备读取到 `buf`
  fn read_block(&self, dev: u32, blockno: u32, buf: &mut [u8]) -> io::Result<()>;

  /// Drain `buf` to the device
  /// 将 `buf` 写入设备
  fn write_block(&self, dev: u32, blockno: u32, buf: &[u8]) -> io::Result<()>;
}

impl<T: BlockDev + ?Sized> BlockDev for Arc<T> {
  #[inline(always)]
  fn read_block(&self, dev: u32, blockno: u32, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_block(dev, blockno, buf)
  }

  #[inline(always)]
  fn write_block(&self, dev: u32, blockno: u32, buf: &[u8]) -> io::Result<()> {
    (**self).write_block(dev, blockno, buf)
  }
}

impl<T: BlockDev + ?Sized> BlockDev for &T {
  #[inline(always)]
  fn read_block(&self, dev: u32, blockno: u32, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_block(dev, blockno, buf)
  }

  #[inline(always)]
  fn write_block(&self, dev: u32, blockno: u32, buf: &[u8]) -> io::Result<()> {
    (**self).write_block(dev, blockno, buf)
  }
}
