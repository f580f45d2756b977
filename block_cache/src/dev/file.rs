//! File-backed block device
//! 文件后端块设备
//!
//! Block `n` of a device lives at byte offset `n * BSIZE` of its file.
//! Reads past EOF yield zeros.
//! 设备的第 `n` 块位于文件偏移 `n * BSIZE`，超出文件末尾的部分读为零。

use std::{
  collections::HashMap,
  fs::{File, OpenOptions},
  io,
  os::unix::fs::FileExt,
  path::Path,
};

use super::BlockDev;
use crate::BSIZE;

#[derive(Default)]
pub struct FileDev {
  files: HashMap<u32, File>,
}

impl FileDev {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attach an opened file as device `dev`
  /// 将已打开的文件挂为设备 `dev`
  pub fn with(mut self, dev: u32, file: File) -> Self {
    self.files.insert(dev, file);
    self
  }

  /// Open or create `path` read-write as device `dev`
  /// 以读写方式打开或创建 `path` 作为设备 `dev`
  pub fn open(self, dev: u32, path: impl AsRef<Path>) -> io::Result<Self> {
    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(path)?;
    Ok(self.with(dev, file))
  }

  fn file(&self, dev: u32) -> io::Result<&File> {
    self
      .files
      .get(&dev)
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no device {dev}")))
  }
}

#[inline(always)]
fn offset(blockno: u32) -> u64 {
  blockno as u64 * BSIZE as u64
}

impl BlockDev for FileDev {
  fn read_block(&self, dev: u32, blockno: u32, buf: &mut [u8]) -> io::Result<()> {
    let file = self.file(dev)?;
    let pos = offset(blockno);
    let mut done = 0;
    while done < buf.len() {
      match file.read_at(&mut buf[done..], pos + done as u64) {
        Ok(0) => {
          buf[done..].fill(0);
          break;
        }
        Ok(n) => done += n,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e),
      }
    }
    Ok(())
  }

  fn write_block(&self, dev: u32, blockno: u32, buf: &[u8]) -> io::Result<()> {
    self.file(dev)?.write_all_at(buf, offset(blockno))
  }
}
