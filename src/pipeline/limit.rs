use std::time::{Duration, Instant};

/// 主循环运行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// 处理指定帧数后停止
    Count(u64),
    /// 运行指定时长后停止（毫秒）
    Duration(u64),
    /// 持续运行直到手动停止
    #[default]
    Continuous,
}

impl LoopMode {
    /// 由命令行参数组合出运行方式，帧数上限优先
    pub fn from_limits(max_frames: Option<u64>, duration_ms: Option<u64>) -> Self {
        match (max_frames, duration_ms) {
            (Some(count), _) => LoopMode::Count(count),
            (None, Some(ms)) => LoopMode::Duration(ms),
            (None, None) => LoopMode::Continuous,
        }
    }

    /// 已处理 `frames` 帧、从 `started` 开始计时的情况下是否达到上限
    pub fn is_reached(&self, frames: u64, started: Instant) -> bool {
        match *self {
            LoopMode::Count(count) => frames >= count,
            LoopMode::Duration(ms) => started.elapsed() >= Duration::from_millis(ms),
            LoopMode::Continuous => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_limits() {
        assert_eq!(LoopMode::from_limits(Some(5), Some(100)), LoopMode::Count(5));
        assert_eq!(LoopMode::from_limits(None, Some(100)), LoopMode::Duration(100));
        assert_eq!(LoopMode::from_limits(None, None), LoopMode::Continuous);
    }

    #[test]
    fn test_is_reached() {
        let now = Instant::now();
        assert!(!LoopMode::Count(3).is_reached(2, now));
        assert!(LoopMode::Count(3).is_reached(3, now));
        assert!(LoopMode::Duration(0).is_reached(0, now));
        assert!(!LoopMode::Duration(60_000).is_reached(0, now));
        assert!(!LoopMode::Continuous.is_reached(u64::MAX, now));
    }
}
