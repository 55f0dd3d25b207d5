use std::time::Duration;

use image::{Rgb, RgbImage};

use livedet::display::{Display, HeadlessDisplay};
use livedet::error::CaptureError;
use livedet::source::{FrameSource, ImageDirSource};

fn write_image(dir: &std::path::Path, name: &str, level: u8) {
    RgbImage::from_pixel(8, 6, Rgb([level, level, level]))
        .save(dir.join(name))
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_reads_sorted_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 20);
        write_image(dir.path(), "a.png", 10);
        write_image(dir.path(), "c.png", 30);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source = ImageDirSource::open(dir.path()).unwrap();
        assert_eq!(source.remaining(), 3);

        let levels: Vec<u8> = (0..3).map(|_| source.read().unwrap().image().get_pixel(0, 0)[0]).collect();
        assert_eq!(levels, vec![10, 20, 30]);
        assert_eq!(source.read().unwrap_err(), CaptureError::EndOfStream);
    }

    #[test]
    fn test_replay_warmup_discards_frames() {
        let dir = tempfile::tempdir().unwrap();
        for (i, name) in ["0.png", "1.png", "2.png"].iter().enumerate() {
            write_image(dir.path(), name, i as u8);
        }

        let mut source = ImageDirSource::open(dir.path()).unwrap();
        source.warmup(2).unwrap();
        assert_eq!(source.read().unwrap().image().get_pixel(0, 0)[0], 2);
    }

    #[test]
    fn test_replay_resize() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 50);

        let mut source = ImageDirSource::open(dir.path()).unwrap().with_resize(16, 12);
        let frame = source.read().unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 12));
        assert_eq!(frame.channels(), 3);
    }

    #[test]
    fn test_replay_empty_dir_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageDirSource::open(dir.path());
        assert!(matches!(result, Err(CaptureError::Open { .. })));
    }

    #[test]
    fn test_replay_closed_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 1);
        let mut source = ImageDirSource::open(dir.path()).unwrap();
        source.close();
        assert!(matches!(source.read(), Err(CaptureError::Read(_))));
    }

    #[test]
    fn test_headless_display() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 1);
        let frame = ImageDirSource::open(dir.path()).unwrap().read().unwrap();

        let mut display = HeadlessDisplay::new();
        display.show(&frame, "test").unwrap();
        assert_eq!(display.frames_shown(), 1);
        assert_eq!(display.poll_key(Duration::from_millis(1)), None);
        assert!(display.is_open());

        display.close();
        display.close();
        assert!(display.show(&frame, "test").is_err());
    }
}
