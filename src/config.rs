use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Tunable constants for label selection and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
    /// Label budget grows by this much per zoom level
    pub labels_per_zoom: f64,
    pub min_labels_per_view: usize,
    pub max_labels_per_view: usize,
    /// zoomFactor = max(pivot - zoom, 1)
    pub zoom_factor_pivot: f64,
    pub min_margin: f64,
    pub margin_scale: f64,
    /// Margin multiplier used when the first pass finds too few candidates
    pub sparse_margin_multiplier: f64,
    /// Thresholding kicks in above budget × this
    pub threshold_multiplier: usize,
    /// Label-to-label spacing in meters at zoomFactor 1
    pub label_spacing: f64,
    /// Label-to-marker spacing in meters at zoomFactor 1
    pub marker_spacing: f64,
    /// Label-to-marker spacing when markers are clustered upstream
    pub clustered_marker_spacing: f64,
    /// Feature property holding the label text
    pub label_property: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            labels_per_zoom: 3.0,
            min_labels_per_view: 5,
            max_labels_per_view: 30,
            zoom_factor_pivot: 11.0,
            min_margin: 0.1,
            margin_scale: 0.3,
            sparse_margin_multiplier: 2.0,
            threshold_multiplier: 2,
            label_spacing: 40.0,
            marker_spacing: 25.0,
            clustered_marker_spacing: 40.0,
            label_property: "id".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("label budget bounds are inverted ({min} > {max})")]
    InvertedBudget { min: usize, max: usize },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("label property key is empty")]
    EmptyLabelProperty,
}

impl LabelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_labels_per_view > self.max_labels_per_view {
            return Err(ConfigError::InvertedBudget {
                min: self.min_labels_per_view,
                max: self.max_labels_per_view,
            });
        }
        let positive = [
            ("labelsPerZoom", self.labels_per_zoom),
            ("zoomFactorPivot", self.zoom_factor_pivot),
            ("marginScale", self.margin_scale),
            ("sparseMarginMultiplier", self.sparse_margin_multiplier),
            ("labelSpacing", self.label_spacing),
            ("markerSpacing", self.marker_spacing),
            ("clusteredMarkerSpacing", self.clustered_marker_spacing),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.min_margin.is_finite() && self.min_margin >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "minMargin",
                value: self.min_margin,
            });
        }
        if self.label_property.trim().is_empty() {
            return Err(ConfigError::EmptyLabelProperty);
        }
        Ok(())
    }

    /// Label budget for a zoom level, clamped to the configured bounds
    pub fn labels_per_view(&self, zoom: f64) -> usize {
        let raw = (zoom * self.labels_per_zoom).floor();
        let raw = if raw.is_finite() && raw > 0.0 { raw as usize } else { 0 };
        raw.clamp(self.min_labels_per_view, self.max_labels_per_view)
    }

    /// Distance scale that shrinks as zoom increases, never below 1
    pub fn zoom_factor(&self, zoom: f64) -> f64 {
        (self.zoom_factor_pivot - zoom).max(1.0)
    }

    pub fn margin(&self, zoom_factor: f64) -> f64 {
        self.min_margin.max(self.margin_scale / zoom_factor)
    }

    pub fn min_label_distance(&self, zoom_factor: f64) -> f64 {
        self.label_spacing / zoom_factor
    }

    pub fn min_marker_distance(&self, zoom_factor: f64, high_obstacle_density: bool) -> f64 {
        let spacing = if high_obstacle_density {
            self.clustered_marker_spacing
        } else {
            self.marker_spacing
        };
        spacing / zoom_factor
    }
}

/// Load a JSON config file, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LabelConfig> {
    let Some(path) = path else {
        return Ok(LabelConfig::default());
    };

    let mut bytes = std::fs::read(path)?;
    let config: LabelConfig = simd_json::serde::from_slice(&mut bytes)?;
    config.validate()?;
    Ok(config)
}
