//! Conversion between element records and live scene objects.

use crate::assets::{AssetError, ImageLoader, LoadedImage};
use crate::color::parse_hex;
use crate::config::CanvasConfig;
use crate::record::{DEFAULT_SCALE, ElementKind, ElementRecord, RecordPatch};
use crate::scene::{ClipMask, ObjectBody, SceneObject};
use kurbo::Point;

/// Outline of the decorative polygon placed on every loaded canvas.
pub const SIGNATURE_POINTS: [(f64, f64); 3] = [(0.0, 0.0), (50.0, 50.0), (100.0, 0.0)];

/// Outline of the decorative polygon's clip mask.
pub const SIGNATURE_MASK_POINTS: [(f64, f64); 3] = [(0.0, 0.0), (50.0, 100.0), (100.0, 100.0)];

/// Builds live objects from records and reads their placement back.
///
/// Construction is permissive: missing or invalid numeric fields fall back
/// to defaults instead of failing, since records may come from hand-edited
/// storage or older layouts.
pub struct ObjectFactory {
    loader: Box<dyn ImageLoader>,
    default_radius: f64,
    default_rect_size: f64,
    default_font_size: f64,
}

impl ObjectFactory {
    pub fn new(config: &CanvasConfig, loader: Box<dyn ImageLoader>) -> Self {
        Self {
            loader,
            default_radius: config.default_radius,
            default_rect_size: config.default_rect_size,
            default_font_size: config.default_font_size,
        }
    }

    /// Whether building this record has to wait for an asset.
    pub fn is_deferred(record: &ElementRecord) -> bool {
        record.kind == ElementKind::Image
    }

    /// Build the live counterpart of `record`, loading its image first if needed.
    pub async fn instantiate(&self, record: &ElementRecord) -> Result<SceneObject, AssetError> {
        if !Self::is_deferred(record) {
            return self.build(record, None);
        }
        let url = record
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AssetError::MissingSource(record.id.clone()))?;
        let image = self.loader.load(url).await?;
        self.build(record, Some(image))
    }

    /// Build a live object synchronously.
    ///
    /// Image records need the loaded image; every other kind ignores it.
    pub fn build(
        &self,
        record: &ElementRecord,
        image: Option<LoadedImage>,
    ) -> Result<SceneObject, AssetError> {
        let fill = record.fill.as_deref().and_then(|hex| {
            let color = parse_hex(hex);
            if color.is_none() {
                log::warn!("Element {} has unreadable fill {:?}", record.id, hex);
            }
            color
        });

        let body = match record.kind {
            ElementKind::Image => {
                let source = record
                    .url
                    .clone()
                    .ok_or_else(|| AssetError::MissingSource(record.id.clone()))?;
                let image = image.ok_or_else(|| AssetError::NotLoaded(source.clone()))?;
                ObjectBody::Image {
                    source,
                    width: image.width,
                    height: image.height,
                }
            }
            ElementKind::Text => ObjectBody::Text {
                content: record.text.clone().unwrap_or_default(),
                font_size: positive_or(record.font_size, self.default_font_size),
                fill,
                editable: true,
            },
            ElementKind::Circle => ObjectBody::Circle {
                radius: positive_or(record.radius, self.default_radius),
                fill,
            },
            ElementKind::Rectangle => ObjectBody::Rect {
                width: positive_or(record.width, self.default_rect_size),
                height: positive_or(record.height, self.default_rect_size),
                fill,
            },
            ElementKind::Polygon => ObjectBody::Polygon {
                points: to_points(&SIGNATURE_POINTS),
                fill,
            },
        };

        let mut object = SceneObject::new(body).with_tag(record.id.clone());
        object.move_to(finite_or(record.left, 0.0), finite_or(record.top, 0.0));
        object.scale_to(
            positive_or(Some(record.scale_x), DEFAULT_SCALE),
            positive_or(Some(record.scale_y), DEFAULT_SCALE),
        );
        object.rotate_to(finite_or(record.angle, 0.0));

        if let Some(reference) = &record.clip_path {
            match ClipMask::parse(reference) {
                Some(mask) => object.clip_mask = Some(mask),
                None => log::warn!("Element {} has unreadable clip path {:?}", record.id, reference),
            }
        }

        Ok(object)
    }

    /// Read placement back from a live object.
    ///
    /// Kind-specific payload is not read; callers merge the result into the
    /// existing record.
    pub fn extract(object: &SceneObject) -> RecordPatch {
        RecordPatch {
            left: Some(object.left),
            top: Some(object.top),
            scale_x: Some(object.scale_x),
            scale_y: Some(object.scale_y),
            angle: Some(object.angle),
            text: None,
        }
    }

    /// Placement fields of a record, in the shape [`ObjectFactory::extract`] reports.
    pub fn placement_of(record: &ElementRecord) -> RecordPatch {
        RecordPatch {
            left: Some(record.left),
            top: Some(record.top),
            scale_x: Some(record.scale_x),
            scale_y: Some(record.scale_y),
            angle: Some(record.angle),
            text: None,
        }
    }

    /// Copy a record's placement onto a live object.
    pub fn place(object: &mut SceneObject, record: &ElementRecord) {
        object.move_to(record.left, record.top);
        object.scale_to(record.scale_x, record.scale_y);
        object.rotate_to(record.angle);
    }

    /// The fixed triangular decoration with its clip mask.
    ///
    /// It borrows position and fill from `anchor` when given. The result is
    /// tagged with `id` but never has a record behind it.
    pub fn signature_decoration(id: impl Into<String>, anchor: Option<&ElementRecord>) -> SceneObject {
        let fill = anchor.and_then(|r| r.fill.as_deref()).and_then(parse_hex);
        let mut object = SceneObject::new(ObjectBody::Polygon {
            points: to_points(&SIGNATURE_POINTS),
            fill,
        })
        .with_tag(id)
        .with_clip_mask(ClipMask::new(to_points(&SIGNATURE_MASK_POINTS)));
        if let Some(anchor) = anchor {
            object.move_to(finite_or(anchor.left, 0.0), finite_or(anchor.top, 0.0));
        }
        object
    }
}

fn to_points(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}
