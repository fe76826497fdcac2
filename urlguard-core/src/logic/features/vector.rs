//! Feature Vector - positional model input
//!
//! Models never see [`FeatureRecord`] directly; they consume this
//! versioned `f32` vector laid out exactly as `FEATURE_LAYOUT`.

use serde::{Deserialize, Serialize};

use super::extractor::FeatureRecord;
use super::layout::{feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn from_record(record: &FeatureRecord) -> Self {
        Self::from_values(record.values().map(|v| v as f32))
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }
}

impl From<&FeatureRecord> for FeatureVector {
    fn from(record: &FeatureRecord) -> Self {
        Self::from_record(record)
    }
}

// ============================================================================
// TESTS
// ============================================================================
