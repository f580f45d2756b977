#![cfg_attr(docsrs, feature(doc_cfg))]

//! # block_cache - Partitioned buffer cache / 分桶缓冲区缓存
//!
//! Fixed pool of block buffers shared by many threads. One holder at a time
//! per block; unrelated blocks contend only when they share a bucket.
//! 多线程共享的固定块缓冲池。每块同一时刻仅一个持有者，不同块仅在同桶时竞争。
//!
//! ```
//! use block_cache::{Cache, Conf, MemDev};
//!
//! let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(4), Conf::Nbucket(2)]);
//! let mut buf = cache.read(1, 7).unwrap();
//! buf[0] = 42;
//! buf.write().unwrap();
//! buf.release();
//!
//! let buf = cache.read(1, 7).unwrap();
//! assert_eq!(buf[0], 42);
//! assert_eq!(cache.dev().reads(), 1);
//! ```

mod bucket;
mod buf;
mod cache;
mod conf;
mod consts;
mod dev;
mod error;
mod id;
mod pin;
mod slot;
mod stat;

pub use buf::Buf;
pub use cache::Cache;
pub use conf::{Conf, ParsedConf, default};
pub use consts::{BSIZE, Block};
pub use dev::BlockDev;
#[cfg(all(feature = "file", unix))]
pub use dev::file::FileDev;
#[cfg(feature = "mem")]
pub use dev::mem::MemDev;
pub use error::{Error, Result};
pub use id::BlockId;
pub use pin::Pin;
pub use stat::{BucketStat, Stat};
