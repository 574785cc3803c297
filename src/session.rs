use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::brush::{Brush, Rasterizer};
use crate::error::Result;
use crate::grid::Grid;
use crate::network::NetworkModel;
use crate::pipeline::{predict, Prediction};

/// Settings for a drawing session. Missing fields in a config file take the
/// defaults: a 700px canvas, a 0.5/1.5/1.0 brush and a 250ms refresh interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub canvas_size: f64,
    pub brush: Brush,
    pub refresh_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            canvas_size: 700.0,
            brush: Brush::default(),
            refresh_interval_ms: 250,
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: SessionConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), ?config, "loaded session config");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// State of one user drawing a digit.
///
/// Strokes mutate the grid synchronously. Classification happens on
/// [`DrawingSession::submit`], or through [`DrawingSession::poll`] in
/// real-time mode, which only re-evaluates a changed grid and never more often
/// than the refresh interval.
#[derive(Debug)]
pub struct DrawingSession {
    grid: Grid,
    brush: Brush,
    rasterizer: Rasterizer,
    refresh_interval: Duration,
    // Strokes are ignored while set, e.g. when a dialog covers the canvas
    suppressed: bool,
    dirty: bool,
    last_refresh: Option<Instant>,
}

impl DrawingSession {
    pub fn new(config: &SessionConfig) -> Self {
        DrawingSession {
            grid: Grid::new(),
            brush: config.brush,
            rasterizer: Rasterizer::new(config.canvas_size),
            refresh_interval: config.refresh_interval(),
            suppressed: false,
            dirty: false,
            last_refresh: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    // One pointer sample; returns the number of cells inked
    pub fn stroke(&mut self, x: f64, y: f64) -> usize {
        if self.suppressed {
            return 0;
        }
        let inked = self.rasterizer.apply_stroke(&mut self.grid, x, y, &self.brush);
        if inked > 0 {
            self.dirty = true;
        }
        inked
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.dirty = true;
    }

    /// Classify the current drawing immediately.
    pub fn submit(&mut self, model: &NetworkModel) -> Result<Prediction> {
        self.submit_at(model, Instant::now())
    }

    fn submit_at(&mut self, model: &NetworkModel, now: Instant) -> Result<Prediction> {
        let prediction = predict(model, &self.grid)?;
        self.dirty = false;
        self.last_refresh = Some(now);
        Ok(prediction)
    }

    /// Real-time mode: classify only if the drawing changed since the last
    /// evaluation and the refresh interval has passed.
    pub fn poll(&mut self, model: &NetworkModel, now: Instant) -> Result<Option<Prediction>> {
        if !self.dirty {
            return Ok(None);
        }
        if let Some(last) = self.last_refresh {
            if now.saturating_duration_since(last) < self.refresh_interval {
                debug!("refresh deferred");
                return Ok(None);
            }
        }
        self.submit_at(model, now).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Activation, Layer};
    use crate::{GRID_AREA, N_CLASSES};

    fn zero_model() -> NetworkModel {
        let layer = Layer::new(
            vec![0.0; N_CLASSES * GRID_AREA],
            GRID_AREA,
            vec![0.0; N_CLASSES],
            Activation::Sigmoid,
        )
        .unwrap();
        NetworkModel::new(vec![layer]).unwrap()
    }

    fn session() -> DrawingSession {
        DrawingSession::new(&SessionConfig {
            canvas_size: 280.0,
            brush: Brush::new(1.0, 1.5, 1.0),
            refresh_interval_ms: 250,
        })
    }

    #[test]
    fn test_stroke_and_clear() {
        let mut s = session();
        assert!(s.stroke(145.0, 145.0) > 0);
        assert!(s.grid().get(14, 14) > 0.0);
        s.clear();
        assert!(s.grid().is_blank());
    }

    #[test]
    fn test_suppressed_ignores_strokes() {
        let mut s = session();
        s.set_suppressed(true);
        assert_eq!(s.stroke(145.0, 145.0), 0);
        assert!(s.grid().is_blank());
        s.set_suppressed(false);
        assert!(s.stroke(145.0, 145.0) > 0);
    }

    #[test]
    fn test_poll_is_debounced() {
        let model = zero_model();
        let mut s = session();
        let t0 = Instant::now();

        // Nothing drawn yet
        assert!(s.poll(&model, t0).unwrap().is_none());

        s.stroke(100.0, 100.0);
        assert!(s.poll(&model, t0).unwrap().is_some());

        // Changed again, but too soon
        s.stroke(120.0, 100.0);
        assert!(s.poll(&model, t0 + Duration::from_millis(100)).unwrap().is_none());
        assert!(s.poll(&model, t0 + Duration::from_millis(250)).unwrap().is_some());

        // Interval passed, but nothing changed
        assert!(s.poll(&model, t0 + Duration::from_millis(900)).unwrap().is_none());
    }

    #[test]
    fn test_submit_resets_dirty() {
        let model = zero_model();
        let mut s = session();
        s.stroke(100.0, 100.0);
        let prediction = s.submit(&model).unwrap();
        assert_eq!(prediction.probabilities.as_array().len(), N_CLASSES);
        assert!(s.poll(&model, Instant::now() + Duration::from_secs(1)).unwrap().is_none());
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: SessionConfig = serde_json::from_str(r#"{"canvas_size": 280.0}"#).unwrap();
        assert_eq!(config.canvas_size, 280.0);
        assert_eq!(config.brush, Brush::default());
        assert_eq!(config.refresh_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_partial_brush_keeps_brush_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"brush": {"radius": 2.0}}"#).unwrap();
        assert_eq!(config.brush, Brush::new(0.5, 2.0, 1.0));
        assert_eq!(config.canvas_size, 700.0);
    }
}
