//! Multi-thread behaviour of the block cache
//! 块缓存多线程行为测试

use std::{
  sync::atomic::{AtomicBool, AtomicUsize, Ordering},
  thread,
};

use aok::{OK, Void};
use block_cache::{Buf, Cache, Conf, Error, MemDev};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const THREADS: usize = 8;

fn counter(buf: &[u8]) -> u64 {
  let mut b = [0u8; 8];
  b.copy_from_slice(&buf[..8]);
  u64::from_le_bytes(b)
}

/// Retry until a buffer frees up
/// 重试直到有缓冲区空闲
fn get_retry(cache: &Cache<MemDev>, dev: u32, blockno: u32) -> Buf<'_, MemDev> {
  loop {
    match cache.get(dev, blockno) {
      Ok(buf) => return buf,
      Err(Error::NoBuf) => thread::yield_now(),
      Err(e) => panic!("get {dev}:{blockno}: {e}"),
    }
  }
}

fn assert_settled(cache: &Cache<MemDev>) {
  let li = cache.buckets();
  let mut slots: Vec<usize> = li.iter().flat_map(|b| b.slots.iter().copied()).collect();
  slots.sort_unstable();
  assert_eq!(slots, (0..cache.cap()).collect::<Vec<_>>());
  for (i, b) in li.iter().enumerate() {
    assert_eq!(b.hint, b.free, "bucket {i} hint drift");
    assert_eq!(b.free, b.slots.len(), "bucket {i} still referenced");
  }
}

#[test]
fn test_mutual_exclusion() -> Void {
  const BLOCKS: usize = 4;
  const ROUNDS: usize = 300;

  let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(8), Conf::Nbucket(3)]);
  let busy: Vec<AtomicBool> = (0..BLOCKS).map(|_| AtomicBool::new(false)).collect();

  thread::scope(|s| {
    for t in 0..THREADS {
      let cache = &cache;
      let busy = &busy;
      s.spawn(move || {
        for i in 0..ROUNDS {
          let k = (t + i) % BLOCKS;
          let mut buf = cache.read(1, k as u32).unwrap();
          assert!(!busy[k].swap(true, Ordering::SeqCst), "block {k} shared");
          let n = counter(&buf) + 1;
          buf[..8].copy_from_slice(&n.to_le_bytes());
          buf.write().unwrap();
          busy[k].store(false, Ordering::SeqCst);
          buf.release();
        }
      });
    }
  });

  let mut total = 0;
  for k in 0..BLOCKS as u32 {
    let buf = cache.read(1, k)?;
    assert_eq!(counter(&buf), counter(&cache.dev().peek(1, k).unwrap()));
    total += counter(&buf);
  }
  assert_eq!(total, (THREADS * ROUNDS) as u64);
  info!("{:?}", cache.stat());
  assert_settled(&cache);
  OK
}

#[test]
fn test_same_block_one_slot() -> Void {
  let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(4), Conf::Nbucket(2)]);
  let slot = AtomicUsize::new(usize::MAX);

  thread::scope(|s| {
    for _ in 0..THREADS {
      s.spawn(|| {
        for _ in 0..100 {
          let buf = cache.read(3, 77).unwrap();
          let prev = slot.swap(buf.slot(), Ordering::SeqCst);
          assert!(prev == usize::MAX || prev == buf.slot());
        }
      });
    }
  });

  // Only the first read loads the block 只有第一次读取加载该块
  assert_eq!(cache.dev().reads(), 1);
  assert_settled(&cache);
  OK
}

#[test]
fn test_steal_under_contention() -> Void {
  const ROUNDS: u32 = 2000;

  // Fewer buffers than threads, many buckets: steals in every direction
  // 缓冲区少于线程且桶多：各方向均有窃取
  let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(4), Conf::Nbucket(7)]);

  thread::scope(|s| {
    for t in 0..THREADS as u32 {
      let cache = &cache;
      s.spawn(move || {
        for i in 0..ROUNDS {
          let blockno = t * ROUNDS + i;
          let mut buf = get_retry(cache, 1, blockno);
          assert_eq!(buf.blockno(), blockno);
          buf[..4].copy_from_slice(&blockno.to_le_bytes());
          drop(buf);
        }
      });
    }
  });

  let st = cache.stat();
  info!("{st:?}");
  assert!(st.steal > 0);
  assert_eq!(st.hit + st.recycle + st.steal, THREADS as u64 * ROUNDS as u64);
  assert_settled(&cache);
  OK
}

#[test]
fn test_pin_across_threads() -> Void {
  let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(2), Conf::Nbucket(2)]);

  let buf = cache.read(1, 0)?;
  let pin = cache.pin(&buf);
  drop(buf);

  thread::scope(|s| {
    for t in 0..THREADS as u32 {
      let cache = &cache;
      s.spawn(move || {
        for i in 0..200 {
          let buf = get_retry(cache, 2, t * 200 + i + 1);
          drop(buf);
        }
      });
    }
  });

  // Pinned block never recycled 被固定的块从未被回收
  let buf = cache.get(1, 0)?;
  assert!(buf.is_valid());
  assert_eq!(buf.slot(), pin.slot());
  drop(buf);
  pin.unpin();
  assert_eq!(cache.dev().reads(), 1);
  assert_settled(&cache);
  OK
}
