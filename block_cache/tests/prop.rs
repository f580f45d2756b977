//! Property-based tests against a reference-count model
//! 基于引用计数模型的属性测试

use std::collections::BTreeSet;

use block_cache::{Buf, Cache, Conf, Error, MemDev, Pin};
use proptest::prelude::*;

const NBUF: usize = 3;
const NBUCKET: usize = 2;

#[derive(Debug, Clone)]
enum Op {
  Read(u32),
  Release(usize),
  Pin(usize),
  Unpin(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (0..8u32).prop_map(Op::Read),
    2 => (0..4usize).prop_map(Op::Release),
    1 => (0..4usize).prop_map(Op::Pin),
    1 => (0..4usize).prop_map(Op::Unpin),
  ]
}

fn check(
  cache: &Cache<MemDev>,
  held: &[Buf<'_, MemDev>],
  pins: &[Pin<'_, MemDev>],
) -> Result<(), TestCaseError> {
  let li = cache.buckets();
  let mut slots: Vec<usize> = li.iter().flat_map(|b| b.slots.iter().copied()).collect();
  slots.sort_unstable();
  prop_assert_eq!(slots, (0..NBUF).collect::<Vec<_>>());

  let referenced: BTreeSet<usize> = held
    .iter()
    .map(|b| b.slot())
    .chain(pins.iter().map(|p| p.slot()))
    .collect();
  let free: usize = li.iter().map(|b| b.free).sum();
  prop_assert_eq!(free, NBUF - referenced.len());
  for b in &li {
    prop_assert_eq!(b.hint, b.free);
  }
  // Referenced blocks sit in their home bucket 被引用的块位于其本桶
  for b in held {
    prop_assert!(li[cache.bucket_of(b.blockno())].slots.contains(&b.slot()));
  }
  Ok(())
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(200))]

  /// Lookups succeed exactly when the block is referenced or a buffer is free,
  /// and the free hint always equals the real free count.
  /// 仅当块已被引用或存在空闲缓冲区时查找成功，空闲提示始终等于实际空闲数。
  #[test]
  fn prop_refcount_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
    let cache = Cache::new(MemDev::new(), &[Conf::Nbuf(NBUF), Conf::Nbucket(NBUCKET)]);
    let mut held: Vec<Buf<'_, MemDev>> = Vec::new();
    let mut pins: Vec<Pin<'_, MemDev>> = Vec::new();

    for op in ops {
      match op {
        Op::Read(blockno) => {
          // Holding it already would block forever 已持有时再次获取会永久阻塞
          if held.iter().any(|b| b.blockno() == blockno) {
            continue;
          }
          let pinned = pins.iter().find(|p| p.id().blockno == blockno).map(|p| p.slot());
          let live: BTreeSet<usize> = held
            .iter()
            .map(|b| b.slot())
            .chain(pins.iter().map(|p| p.slot()))
            .collect();
          match cache.read(1, blockno) {
            Ok(buf) => {
              prop_assert!(pinned.is_some() || live.len() < NBUF);
              if let Some(slot) = pinned {
                prop_assert_eq!(buf.slot(), slot);
              }
              prop_assert!(!live.contains(&buf.slot()) || pinned == Some(buf.slot()));
              prop_assert!(buf.is_valid());
              held.push(buf);
            }
            Err(Error::NoBuf) => {
              prop_assert!(pinned.is_none() && live.len() == NBUF);
            }
            Err(e) => prop_assert!(false, "device error {}", e),
          }
        }
        Op::Release(i) => {
          if i < held.len() {
            held.swap_remove(i).release();
          }
        }
        Op::Pin(i) => {
          if i < held.len() {
            let pin = cache.pin(&held[i]);
            pins.push(pin);
          }
        }
        Op::Unpin(i) => {
          if i < pins.len() {
            pins.swap_remove(i).unpin();
          }
        }
      }
      check(&cache, &held, &pins)?;
    }

    drop(held);
    drop(pins);
    for b in cache.buckets() {
      prop_assert_eq!(b.free, b.slots.len());
    }
  }
}
