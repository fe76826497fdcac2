//! Features Module - URL Feature Extraction Engine
//!
//! Raw URL string → fixed 20-column record → positional vector for models.

pub mod layout;
pub mod url_parts;
pub mod extractor;
pub mod vector;


// Re-export common types
pub use extractor::{extract_features, ChartPoint, FeatureRecord};
pub use layout::{
    chart_label, describe_layout, feature_description, FeatureDescriptor, LayoutInfo,
    CHART_FEATURES, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, SENTINEL,
};
pub use url_parts::UrlParts;
pub use vector::FeatureVector;
