use std::io::Write;
use std::path::PathBuf;

use livedet::config::{AppConfig, DEFAULT_PALETTE};
use livedet::error::ConfigError;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.camera.index, 0);
        assert_eq!((config.camera.width, config.camera.height), (1280, 720));
        assert_eq!(config.camera.warmup_frames, 30);
        assert_eq!(config.model.name, "yolov8m");
        assert_eq!(config.model.confidence_threshold, 0.3);
        assert_eq!(config.model.skip_frames, 2);
        assert_eq!(config.display.palette, DEFAULT_PALETTE.to_vec());
        assert_eq!((config.keys.quit, config.keys.pause, config.keys.screenshot), ('q', 'p', 's'));
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
        assert_eq!(config.output.save_frequency, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            [camera]
            index = 1
            mirror = false

            [model]
            skip_frames = 3
            confidence_threshold = 0.5

            [display]
            palette = [[255, 0, 0]]

            [keys]
            quit = "x"
            "#,
        );

        let config = AppConfig::from_path(file.path()).unwrap();

        assert_eq!(config.camera.index, 1);
        assert!(!config.camera.mirror);
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.model.skip_frames, 3);
        assert_eq!(config.model.confidence_threshold, 0.5);
        assert_eq!(config.model.nms_threshold, 0.45);
        assert_eq!(config.display.palette, vec![[255, 0, 0]]);
        assert_eq!(config.keys.quit, 'x');
        assert_eq!(config.keys.pause, 'p');
        assert!(config.validate().is_ok());

        let style = config.style();
        assert_eq!(style.quit_key, 'x');
        assert_eq!(style.palette.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_path(&PathBuf::from("/nonexistent/livedet.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[model]\nskip_frames = \"two\"\n");
        let result = AppConfig::from_path(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases: Vec<fn(&mut AppConfig)> = vec![
            |c| c.model.skip_frames = 0,
            |c| c.model.confidence_threshold = 1.5,
            |c| c.display.palette.clear(),
            |c| c.display.line_thickness = 0,
            |c| c.display.font_scale = 0.0,
            |c| c.keys.pause = 'q',
            |c| c.output.save_frequency = 0,
            |c| c.camera.width = 0,
        ];

        for (i, mutate) in cases.into_iter().enumerate() {
            let mut config = AppConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "case {i} should be rejected"
            );
        }
    }
}
