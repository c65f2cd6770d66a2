use anyhow::{anyhow, Result};
use chrono::Utc;
use execmind::host::CaptureResult;
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use xcap::Monitor;

/// Something that can grab the primary screen
pub trait ScreenSource: Send + Sync {
    fn capture_primary(&self) -> Result<RgbaImage>;
}

/// The real desktop, via xcap
pub struct XcapScreen;

impl ScreenSource for XcapScreen {
    fn capture_primary(&self) -> Result<RgbaImage> {
        let monitors = Monitor::all()?;
        let monitor = monitors
            .iter()
            .find(|monitor| monitor.is_primary())
            .or_else(|| monitors.first())
            .ok_or_else(|| anyhow!("no screen source found"))?;

        Ok(monitor.capture_image()?)
    }
}

pub fn screenshot_path(dir: &Path, epoch_ms: i64) -> PathBuf {
    dir.join(format!("screenshot-{}.png", epoch_ms))
}

/// Capture the primary screen into `dir` as `screenshot-<epoch-ms>.png`.
/// Failures are logged and reported in the result, never raised.
pub fn capture_screen(source: &dyn ScreenSource, dir: &Path) -> CaptureResult {
    match save_capture(source, dir) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "saved screenshot");
            CaptureResult::saved(path.display().to_string())
        }
        Err(e) => {
            tracing::error!("screenshot failed: {:#}", e);
            CaptureResult::failed(e.to_string())
        }
    }
}

fn save_capture(source: &dyn ScreenSource, dir: &Path) -> Result<PathBuf> {
    let image = source.capture_primary()?;
    let path = screenshot_path(dir, Utc::now().timestamp_millis());
    image.save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}
