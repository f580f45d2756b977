//! Cache configuration
//! 缓存配置

/// Default configuration values (xv6 style)
/// 默认配置值（xv6 风格）
pub mod default {
  /// Buffer count 缓冲区数量
  pub const NBUF: usize = 30;
  /// Bucket count, prime for dense block numbers 桶数量，素数便于分散连续块号
  pub const NBUCKET: usize = 13;
}

/// Cache configuration item
/// 缓存配置项
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Total buffer count (min 1)
  /// 缓冲区总数（最小 1）
  Nbuf(usize),
  /// Bucket count (min 1)
  /// 桶数量（最小 1）
  Nbucket(usize),
}

/// Parsed configuration
/// 解析后的配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedConf {
  pub nbuf: usize,
  pub nbucket: usize,
}

impl Default for ParsedConf {
  fn default() -> Self {
    Self {
      nbuf: default::NBUF,
      nbucket: default::NBUCKET,
    }
  }
}

impl ParsedConf {
  pub fn new(conf: &[Conf]) -> Self {
    let mut c = Self::default();
    for item in conf {
      match *item {
        Conf::Nbuf(v) => c.nbuf = v.max(1),
        Conf::Nbucket(v) => c.nbucket = v.max(1),
      }
    }
    c
  }
}
