//! Error types for block_cache
//! block_cache 错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  /// Every buffer is referenced
  /// 所有缓冲区都在使用中
  #[error("no free buffer / 无可用缓冲区")]
  NoBuf,

  /// Forwarded unmodified from the block device
  /// 块设备错误，原样转发
  #[error("device: {0}")]
  Dev(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
