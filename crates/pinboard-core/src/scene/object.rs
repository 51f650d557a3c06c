//! Live scene objects.

use crate::record::ElementKind;
use kurbo::Point;
use peniko::Color;

/// Kind-specific geometry and paint of a live object.
#[derive(Debug, Clone)]
pub enum ObjectBody {
    Image {
        source: String,
        /// Natural size in pixels.
        width: u32,
        height: u32,
    },
    Text {
        content: String,
        font_size: f64,
        fill: Option<Color>,
        editable: bool,
    },
    Circle {
        radius: f64,
        fill: Option<Color>,
    },
    Rect {
        width: f64,
        height: f64,
        fill: Option<Color>,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Color>,
    },
}

impl ObjectBody {
    pub fn kind(&self) -> ElementKind {
        match self {
            ObjectBody::Image { .. } => ElementKind::Image,
            ObjectBody::Text { .. } => ElementKind::Text,
            ObjectBody::Circle { .. } => ElementKind::Circle,
            ObjectBody::Rect { .. } => ElementKind::Rectangle,
            ObjectBody::Polygon { .. } => ElementKind::Polygon,
        }
    }

    pub fn fill(&self) -> Option<Color> {
        match self {
            ObjectBody::Image { .. } => None,
            ObjectBody::Text { fill, .. }
            | ObjectBody::Circle { fill, .. }
            | ObjectBody::Rect { fill, .. }
            | ObjectBody::Polygon { fill, .. } => *fill,
        }
    }
}

/// Polygon constraining an object's visible region, in object-local coordinates.
#[derive(Debug, Clone)]
pub struct ClipMask {
    pub points: Vec<Point>,
    pub fill: Color,
    pub selectable: bool,
}

impl ClipMask {
    /// Create a transparent, non-selectable mask.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            fill: Color::from_rgba8(0, 0, 0, 0),
            selectable: false,
        }
    }

    /// Parse a geometry reference of the form `"x1,y1 x2,y2 x3,y3 ..."`.
    ///
    /// At least three points are required.
    pub fn parse(reference: &str) -> Option<Self> {
        let points = reference
            .split_whitespace()
            .map(|pair| {
                let (x, y) = pair.split_once(',')?;
                let x: f64 = x.trim().parse().ok()?;
                let y: f64 = y.trim().parse().ok()?;
                (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
            })
            .collect::<Option<Vec<_>>>()?;
        (points.len() >= 3).then(|| Self::new(points))
    }
}

/// A live, renderable object.
///
/// Placement is held as separate components (position, scale, rotation in
/// degrees), so values read back exactly as they were set.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Opaque custom field. Carries the logical id of the backing record.
    pub tag: Option<String>,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees.
    pub angle: f64,
    pub selectable: bool,
    pub clip_mask: Option<ClipMask>,
    pub body: ObjectBody,
}

impl SceneObject {
    /// Create an untagged object at the origin with identity placement.
    pub fn new(body: ObjectBody) -> Self {
        Self {
            tag: None,
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            selectable: true,
            clip_mask: None,
            body,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_clip_mask(mut self, mask: ClipMask) -> Self {
        self.clip_mask = Some(mask);
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    pub fn move_to(&mut self, left: f64, top: f64) {
        self.left = left;
        self.top = top;
    }

    pub fn scale_to(&mut self, scale_x: f64, scale_y: f64) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
    }

    pub fn rotate_to(&mut self, angle: f64) {
        self.angle = angle;
    }
}
