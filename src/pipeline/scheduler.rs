use crate::detect::Detection;

/// 流水线生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 丢弃前N帧，等待摄像头自动曝光稳定
    WarmingUp,
    Running,
    /// 继续采集和显示，但跳过检测
    Paused,
    Stopping,
    /// 资源已释放，最终统计已输出
    Terminated,
}

/// 是否对第 `frame_index` 帧（从1开始）执行检测
///
/// 固定间隔跳帧是唯一的背压手段，不根据实际推理耗时调整。
/// `skip_interval` 为0时按1处理。
pub fn should_detect(frame_index: u64, skip_interval: u64, paused: bool) -> bool {
    !paused && frame_index % skip_interval.max(1) == 0
}

/// 平均帧率，`elapsed_seconds` 不为正时返回0
pub fn compute_fps(frame_count: u64, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds > 0.0 {
        frame_count as f64 / elapsed_seconds
    } else {
        0.0
    }
}

/// 跳帧调度与检测结果延续
///
/// 被跳过的帧沿用最近一次检测的结果；新的检测结果整体覆盖旧结果，不做合并。
#[derive(Debug)]
pub struct Scheduler {
    skip_interval: u64,
    phase: Phase,
    last_detections: Vec<Detection>,
}

impl Scheduler {
    pub fn new(skip_interval: u64) -> Self {
        Self {
            skip_interval: skip_interval.max(1),
            phase: Phase::WarmingUp,
            last_detections: Vec::new(),
        }
    }

    pub fn skip_interval(&self) -> u64 {
        self.skip_interval
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self.phase, Phase::Stopping | Phase::Terminated)
    }

    pub fn should_detect(&self, frame_index: u64) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
            && should_detect(frame_index, self.skip_interval, self.is_paused())
    }

    /// 跳过检测的帧使用的结果：上一次检测周期的结果，首帧之前为空
    pub fn carry_forward(&self) -> &[Detection] {
        &self.last_detections
    }

    /// 用新一轮检测结果覆盖旧结果
    pub fn replace(&mut self, detections: Vec<Detection>) -> &[Detection] {
        self.last_detections = detections;
        &self.last_detections
    }

    /// 预热完成，进入运行状态
    pub fn start(&mut self) {
        if self.phase == Phase::WarmingUp {
            self.phase = Phase::Running;
        }
    }

    /// 在运行与暂停之间切换，返回切换后是否处于暂停
    ///
    /// 暂停期间不再检测，画面沿用暂停前最后一次的检测结果。
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Running => self.phase = Phase::Paused,
            Phase::Paused => self.phase = Phase::Running,
            _ => {}
        }
        self.is_paused()
    }

    pub fn stop(&mut self) {
        if self.phase != Phase::Terminated {
            self.phase = Phase::Stopping;
        }
    }

    pub fn terminate(&mut self) {
        self.phase = Phase::Terminated;
        self.last_detections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;

    #[test]
    fn test_should_detect_matches_modulo() {
        for k in 1..=7u64 {
            for i in 1..=50u64 {
                assert_eq!(should_detect(i, k, false), i % k == 0, "frame {i}, interval {k}");
                assert!(!should_detect(i, k, true));
            }
        }
        assert!(should_detect(3, 0, false));
    }

    #[test]
    fn test_compute_fps() {
        assert_eq!(compute_fps(0, 0.0), 0.0);
        assert_eq!(compute_fps(100, 0.0), 0.0);
        assert_eq!(compute_fps(100, 10.0), 10.0);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut s = Scheduler::new(2);
        assert_eq!(s.phase(), Phase::WarmingUp);
        assert!(!s.should_detect(2));
        s.start();
        assert!(s.should_detect(2));
        assert!(s.toggle_pause());
        assert!(!s.should_detect(2));
        assert!(!s.toggle_pause());
        assert_eq!(s.phase(), Phase::Running);
        s.stop();
        assert!(s.is_stopping());
        assert!(!s.toggle_pause());
        s.terminate();
        assert_eq!(s.phase(), Phase::Terminated);
    }

    #[test]
    fn test_pause_keeps_carried_detections() {
        let mut s = Scheduler::new(2);
        s.start();
        let a = Detection::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "a", 0.5, 0);
        s.replace(vec![a.clone()]);
        assert!(s.toggle_pause());
        assert_eq!(s.carry_forward(), &[a.clone()][..]);
        assert!(!s.toggle_pause());
        assert_eq!(s.carry_forward(), &[a][..]);
    }

    #[test]
    fn test_replace_overwrites() {
        let mut s = Scheduler::new(1);
        assert!(s.carry_forward().is_empty());
        let a = Detection::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "a", 0.5, 0);
        let b = Detection::new(BoundingBox::new(0.0, 0.0, 2.0, 2.0), "b", 0.6, 1);
        s.replace(vec![a.clone(), b]);
        assert_eq!(s.carry_forward().len(), 2);
        s.replace(vec![a.clone()]);
        assert_eq!(s.carry_forward(), &[a][..]);
        s.replace(Vec::new());
        assert!(s.carry_forward().is_empty());
    }
}
