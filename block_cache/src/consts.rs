//! Constants 常量

/// Block size in bytes, same for every device
/// 块大小（字节），所有设备相同
pub const BSIZE: usize = 1024;

/// One block image
/// 单个块数据
pub type Block = [u8; BSIZE];
