//! Persisted element records.
//!
//! An [`ElementRecord`] is the durable, serializable form of one shape. Its
//! JSON layout is the storage wire contract: field names are fixed and
//! optional fields that are absent stay absent when written back.

use serde::{Deserialize, Deserializer, Serialize};

/// Default scale factor on both axes.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Kind of shape a record describes. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Image,
    Text,
    Circle,
    Rectangle,
    Polygon,
}

impl ElementKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Image => "image",
            ElementKind::Text => "text",
            ElementKind::Circle => "circle",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Polygon => "polygon",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable unit: one shape, keyed by its logical id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Logical id joining this record to its live object.
    #[serde(rename = "clipPathId")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Image source (image only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub left: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub top: f64,
    /// Text content (text only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Fill color as a hex string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Clip mask geometry reference: `"x1,y1 x2,y2 x3,y3 ..."`.
    #[serde(rename = "clipPath", default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<String>,
    /// Circle radius (circle only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Rectangle width (rectangle only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rectangle height (rectangle only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "scalex", default = "default_scale", deserialize_with = "one_if_null")]
    pub scale_x: f64,
    #[serde(rename = "scaley", default = "default_scale", deserialize_with = "one_if_null")]
    pub scale_y: f64,
    /// Rotation in degrees.
    #[serde(default, deserialize_with = "zero_if_null")]
    pub angle: f64,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

// Hand-edited payloads sometimes carry explicit nulls.
fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn one_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_SCALE))
}

impl ElementRecord {
    /// Create a record at the origin with default scale and rotation.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            url: None,
            left: 0.0,
            top: 0.0,
            text: None,
            font_size: None,
            fill: None,
            clip_path: None,
            radius: None,
            width: None,
            height: None,
            scale_x: DEFAULT_SCALE,
            scale_y: DEFAULT_SCALE,
            angle: 0.0,
        }
    }

    /// Create an image record.
    pub fn image(id: impl Into<String>, url: impl Into<String>) -> Self {
        let mut record = Self::new(id, ElementKind::Image);
        record.url = Some(url.into());
        record
    }

    /// Create a text record.
    pub fn text(id: impl Into<String>, content: impl Into<String>, font_size: f64) -> Self {
        let mut record = Self::new(id, ElementKind::Text);
        record.text = Some(content.into());
        record.font_size = Some(font_size);
        record
    }

    /// Create a circle record.
    pub fn circle(id: impl Into<String>, radius: f64) -> Self {
        let mut record = Self::new(id, ElementKind::Circle);
        record.radius = Some(radius);
        record
    }

    /// Create a rectangle record.
    pub fn rectangle(id: impl Into<String>, width: f64, height: f64) -> Self {
        let mut record = Self::new(id, ElementKind::Rectangle);
        record.width = Some(width);
        record.height = Some(height);
        record
    }

    /// Set the position.
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Set the clip mask reference.
    pub fn with_clip_path(mut self, clip_path: impl Into<String>) -> Self {
        self.clip_path = Some(clip_path.into());
        self
    }

    /// Set the scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the rotation in degrees.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }
}

/// Fields read back from a live object.
///
/// Every field is optional: a live object reports only what it carries, and
/// [`merge`] keeps the existing value for everything it leaves out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    /// Edited text content. Ignored for non-text records.
    pub text: Option<String>,
}

impl RecordPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `patch` on top of `existing`, field by field.
///
/// Identity, kind and kind-specific payload are never touched. Non-finite
/// numbers and non-positive scale factors in the patch are ignored so a
/// degenerate transform cannot corrupt the stored record.
pub fn merge(existing: &ElementRecord, patch: &RecordPatch) -> ElementRecord {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);

    let mut updated = existing.clone();
    updated.left = finite(patch.left).unwrap_or(existing.left);
    updated.top = finite(patch.top).unwrap_or(existing.top);
    updated.scale_x = positive(patch.scale_x).unwrap_or(existing.scale_x);
    updated.scale_y = positive(patch.scale_y).unwrap_or(existing.scale_y);
    updated.angle = finite(patch.angle).unwrap_or(existing.angle);
    if existing.kind == ElementKind::Text {
        if let Some(text) = &patch.text {
            updated.text = Some(text.clone());
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let record = ElementRecord::circle("c1", 50.0)
            .at(10.0, 20.0)
            .with_fill("#A1B2C3");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["clipPathId"], "c1");
        assert_eq!(json["type"], "circle");
        assert_eq!(json["radius"], 50.0);
        assert_eq!(json["scalex"], 1.0);
        assert_eq!(json["scaley"], 1.0);
        assert_eq!(json["angle"], 0.0);
        assert_eq!(json["fill"], "#A1B2C3");
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let record = ElementRecord::circle("c1", 50.0);
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();

        for key in ["url", "text", "fontSize", "fill", "clipPath", "width", "height"] {
            assert!(!obj.contains_key(key), "{key} should be absent");
        }
    }

    #[test]
    fn test_missing_numeric_fields_default() {
        let json = r#"{"clipPathId":"t1","type":"text","text":"hi"}"#;
        let record: ElementRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.left, 0.0);
        assert_eq!(record.top, 0.0);
        assert_eq!(record.scale_x, 1.0);
        assert_eq!(record.scale_y, 1.0);
        assert_eq!(record.angle, 0.0);
    }

    #[test]
    fn test_null_numeric_fields_default() {
        let json = r#"{"clipPathId":"r1","type":"rectangle","left":null,"scalex":null,"angle":null}"#;
        let record: ElementRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.left, 0.0);
        assert_eq!(record.scale_x, 1.0);
        assert_eq!(record.angle, 0.0);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"clipPathId":"x","type":"hexagon"}"#;
        assert!(serde_json::from_str::<ElementRecord>(json).is_err());
    }

    #[test]
    fn test_merge_falls_back_per_field() {
        let existing = ElementRecord::rectangle("r1", 100.0, 100.0)
            .at(5.0, 6.0)
            .with_fill("#000000")
            .with_angle(15.0);
        let patch = RecordPatch {
            left: Some(40.0),
            scale_y: Some(2.0),
            ..Default::default()
        };

        let merged = merge(&existing, &patch);
        assert_eq!(merged.left, 40.0);
        assert_eq!(merged.top, 6.0);
        assert_eq!(merged.scale_x, 1.0);
        assert_eq!(merged.scale_y, 2.0);
        assert_eq!(merged.angle, 15.0);
        assert_eq!(merged.fill.as_deref(), Some("#000000"));
        assert_eq!(merged.id, "r1");
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let existing = ElementRecord::circle("c1", 10.0).at(1.0, 2.0);
        assert!(RecordPatch::default().is_empty());
        assert_eq!(merge(&existing, &RecordPatch::default()), existing);
    }

    #[test]
    fn test_merge_rejects_degenerate_values() {
        let existing = ElementRecord::circle("c1", 10.0).with_scale(2.0, 3.0);
        let patch = RecordPatch {
            left: Some(f64::NAN),
            scale_x: Some(0.0),
            scale_y: Some(-1.0),
            angle: Some(f64::INFINITY),
            ..Default::default()
        };

        assert_eq!(merge(&existing, &patch), existing);
    }

    #[test]
    fn test_merge_text_only_for_text_records() {
        let patch = RecordPatch {
            text: Some("edited".to_string()),
            ..Default::default()
        };

        let text = ElementRecord::text("t1", "draft", 20.0);
        assert_eq!(merge(&text, &patch).text.as_deref(), Some("edited"));

        let circle = ElementRecord::circle("c1", 10.0);
        assert_eq!(merge(&circle, &patch).text, None);
    }
}
