//! Screenshot comparison for visual regression detection.
//!
//! Two images are decoded to RGB, the current image is resized to the
//! baseline's dimensions when they differ, and the mean absolute
//! per-channel difference is turned into similarity, regression and
//! severity figures. A detected regression is logged as a defect.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{round2, Severity};
use crate::error::{VisionError, VisionResult};
use crate::storage::{Defect, Storage};

/// Differences above this percentage count as a regression.
pub const REGRESSION_THRESHOLD: f64 = 5.0;

/// Differences above this percentage are HIGH severity.
pub const HIGH_SEVERITY_ABOVE: f64 = 20.0;

/// Differences above this percentage are MEDIUM severity.
pub const MEDIUM_SEVERITY_ABOVE: f64 = 10.0;

/// Numeric outcome of comparing two pixel grids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualDiff {
    /// Mean absolute channel difference in `[0, 255]`.
    pub diff_score: f64,
    pub similarity_percent: f64,
    pub difference_percent: f64,
    pub regression: bool,
    /// Bucket for `difference_percent`; LOW when no regression.
    pub severity: Severity,
}

impl VisualDiff {
    /// Derive percentages, regression flag and severity from a mean difference.
    pub fn from_diff_score(diff_score: f64) -> Self {
        let similarity = (100.0 - diff_score / 255.0 * 100.0).max(0.0);
        let difference = 100.0 - similarity;
        let similarity_percent = round2(similarity);
        let difference_percent = round2(difference);

        let severity = if difference_percent > HIGH_SEVERITY_ABOVE {
            Severity::High
        } else if difference_percent > MEDIUM_SEVERITY_ABOVE {
            Severity::Medium
        } else {
            Severity::Low
        };

        Self {
            diff_score,
            similarity_percent,
            difference_percent,
            regression: difference_percent > REGRESSION_THRESHOLD,
            severity,
        }
    }
}

/// Mean absolute per-channel difference of two equally sized RGB images.
pub fn mean_abs_diff(baseline: &RgbImage, current: &RgbImage) -> VisionResult<f64> {
    let a = baseline.as_raw();
    let b = current.as_raw();
    if a.is_empty() || a.len() != b.len() {
        return Err(VisionError::EmptyImage);
    }

    let total: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();
    Ok(total as f64 / a.len() as f64)
}

/// Decode both images and compare them.
///
/// CPU-bound; callers on an async runtime should run this on a blocking thread.
pub fn compare_images(baseline: &[u8], current: &[u8]) -> VisionResult<VisualDiff> {
    let baseline = image::load_from_memory(baseline)?.to_rgb8();
    let mut current = image::load_from_memory(current)?.to_rgb8();

    if baseline.width() == 0 || baseline.height() == 0 {
        return Err(VisionError::EmptyImage);
    }

    if baseline.dimensions() != current.dimensions() {
        current = imageops::resize(
            &current,
            baseline.width(),
            baseline.height(),
            FilterType::Nearest,
        );
    }

    mean_abs_diff(&baseline, &current).map(VisualDiff::from_diff_score)
}

/// Metadata identifying where a screenshot pair came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonContext {
    pub session_id: String,
    pub industry: String,
    pub module_name: String,
}

/// JSON body returned for a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualReport {
    pub visual_analysis: VisualAnalysis,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualAnalysis {
    pub similarity_percent: f64,
    pub difference_percent: f64,
    pub visual_regression_detected: bool,
    pub regression_severity: Severity,
}

impl From<VisualDiff> for VisualReport {
    fn from(diff: VisualDiff) -> Self {
        let summary = if diff.regression {
            format!("Visual regression detected with {} severity.", diff.severity)
        } else {
            "UI looks stable.".to_string()
        };

        Self {
            visual_analysis: VisualAnalysis {
                similarity_percent: diff.similarity_percent,
                difference_percent: diff.difference_percent,
                visual_regression_detected: diff.regression,
                regression_severity: diff.severity,
            },
            summary,
        }
    }
}

/// Compares screenshots and records regressions in the defect log.
#[derive(Clone)]
pub struct VisualDiffDetector {
    storage: Arc<dyn Storage>,
}

impl VisualDiffDetector {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Compare two encoded images and log a defect when they regress.
    ///
    /// Decoding runs on a blocking thread. Decode and storage failures are
    /// returned as [`anyhow::Error`] for the caller to render.
    pub async fn detect(
        &self,
        context: &ComparisonContext,
        baseline: Vec<u8>,
        current: Vec<u8>,
    ) -> anyhow::Result<VisualReport> {
        let diff = tokio::task::spawn_blocking(move || compare_images(&baseline, &current))
            .await
            .map_err(|e| VisionError::Task {
                message: e.to_string(),
            })??;

        info!(
            session_id = %context.session_id,
            module = %context.module_name,
            similarity = diff.similarity_percent,
            regression = diff.regression,
            "Screenshots compared"
        );

        if diff.regression {
            let defect = Defect::new(
                &context.session_id,
                &context.industry,
                &context.module_name,
                diff.severity,
            );
            if let Err(e) = self.storage.insert_defect(&defect).await {
                warn!(error = %e, "Failed to log visual regression defect");
                return Err(e.into());
            }
        }

        Ok(diff.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png)
            .expect("Failed to encode test image");
        bytes.into_inner()
    }

    #[test]
    fn test_identical_images() {
        let img = encode_png(&solid(4, 4, [10, 200, 30]));
        let diff = compare_images(&img, &img).unwrap();

        assert_eq!(diff.diff_score, 0.0);
        assert_eq!(diff.similarity_percent, 100.0);
        assert_eq!(diff.difference_percent, 0.0);
        assert!(!diff.regression);
        assert_eq!(diff.severity, Severity::Low);
    }

    #[test]
    fn test_inverted_images() {
        let black = encode_png(&solid(3, 2, [0, 0, 0]));
        let white = encode_png(&solid(3, 2, [255, 255, 255]));
        let diff = compare_images(&black, &white).unwrap();

        assert_eq!(diff.diff_score, 255.0);
        assert_eq!(diff.similarity_percent, 0.0);
        assert_eq!(diff.difference_percent, 100.0);
        assert!(diff.regression);
        assert_eq!(diff.severity, Severity::High);
    }

    #[test]
    fn test_absolute_difference_is_symmetric() {
        let dark = encode_png(&solid(2, 2, [10, 10, 10]));
        let light = encode_png(&solid(2, 2, [60, 60, 60]));
        let forward = compare_images(&dark, &light).unwrap();
        let backward = compare_images(&light, &dark).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.diff_score, 50.0);
    }

    #[test]
    fn test_mismatched_dimensions_are_reconciled() {
        let baseline = encode_png(&solid(8, 8, [100, 100, 100]));
        let current = encode_png(&solid(4, 2, [100, 100, 100]));
        let diff = compare_images(&baseline, &current).unwrap();
        assert_eq!(diff.diff_score, 0.0);
        assert!(!diff.regression);
    }

    #[test]
    fn test_severity_buckets() {
        // difference_percent = diff / 255 * 100
        let low = VisualDiff::from_diff_score(255.0 * 0.08);
        assert!(low.regression);
        assert_eq!(low.severity, Severity::Low);

        let medium = VisualDiff::from_diff_score(255.0 * 0.15);
        assert!(medium.regression);
        assert_eq!(medium.severity, Severity::Medium);

        let high = VisualDiff::from_diff_score(255.0 * 0.25);
        assert_eq!(high.severity, Severity::High);

        let stable = VisualDiff::from_diff_score(255.0 * 0.05);
        assert!(!stable.regression);
    }

    #[test]
    fn test_undecodable_input() {
        let valid = encode_png(&solid(2, 2, [0, 0, 0]));
        let err = compare_images(b"not an image", &valid).unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
    }

    #[test]
    fn test_mean_abs_diff_rejects_empty() {
        let empty = RgbImage::new(0, 0);
        assert!(matches!(
            mean_abs_diff(&empty, &empty),
            Err(VisionError::EmptyImage)
        ));
    }

    #[test]
    fn test_report_summary() {
        let report = VisualReport::from(VisualDiff::from_diff_score(255.0));
        assert_eq!(report.summary, "Visual regression detected with HIGH severity.");
        assert!(report.visual_analysis.visual_regression_detected);

        let report = VisualReport::from(VisualDiff::from_diff_score(0.0));
        assert_eq!(report.summary, "UI looks stable.");
    }
}
