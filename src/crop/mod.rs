//! Crop/rotation geometry for the two stacked editor layers.
//!
//! The image layer is scaled and translated so the cropped sub-region of the
//! source exactly covers the target output rectangle; the content (annotation)
//! layer is rotated around its center and scaled up so the rotated rectangle
//! never exposes a corner of the viewport.

/// Fractional crop rectangle plus a rotation around the crop center.
///
/// Coordinates are relative to the unrotated source image, in `[0, 1]`.
/// Callers must guarantee `left < right` and `top < bottom`; a degenerate
/// rectangle is a contract violation and is not defended against here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropState {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    /// Degrees around the crop center, on top of any 90°-step source rotation.
    pub rotation: f32,
}

impl CropState {
    pub const FULL_FRAME: CropState = CropState::new(0.0, 0.0, 1.0, 1.0, 0.0);

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64, rotation: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            rotation,
        }
    }

    /// A full-frame rectangle with zero rotation crops nothing.
    pub fn is_empty(&self) -> bool {
        self.left == 0.0
            && self.top == 0.0
            && self.right == 1.0
            && self.bottom == 1.0
            && self.rotation == 0.0
    }

    pub fn width_fraction(&self) -> f64 {
        self.right - self.left
    }

    pub fn height_fraction(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Host-owned description of the source image being edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRef {
    pub width: u32,
    pub height: u32,
    /// Visual rotation in 90° steps, combined with any crop-induced quarter
    /// turns. Applied to the image layer as a whole.
    pub rotation: i32,
    pub crop: Option<CropState>,
}

impl SourceRef {
    pub const fn new(width: u32, height: u32, rotation: i32, crop: Option<CropState>) -> Self {
        Self {
            width,
            height,
            rotation,
            crop,
        }
    }
}

/// Scale/translate applied to the image (texture) layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl LayerTransform {
    pub const IDENTITY: LayerTransform = LayerTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };
}

/// Rotation/scale applied to the content (annotation) layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentTransform {
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl ContentTransform {
    pub const IDENTITY: ContentTransform = ContentTransform {
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };
}

/// Whether a 90°-step rotation swaps the texture axes.
pub fn is_quarter_rotated(rotation: i32) -> bool {
    rotation.rem_euclid(180) != 0
}

/// Transform for the image layer: scales the `texture_width × texture_height`
/// layer so the crop rectangle covers `target_width × target_height`, then
/// recenters the crop midpoint. The larger of the horizontal/vertical ratios
/// is chosen so the crop always covers the target.
pub fn image_layer_transform(
    texture_width: u32,
    texture_height: u32,
    crop: Option<&CropState>,
    target_width: u32,
    target_height: u32,
) -> LayerTransform {
    let crop = match crop {
        Some(crop) if !crop.is_empty() => crop,
        _ => return LayerTransform::IDENTITY,
    };

    let texture_width = f64::from(texture_width);
    let texture_height = f64::from(texture_height);

    let scale = f64::max(
        f64::from(target_width) / (texture_width * crop.width_fraction()),
        f64::from(target_height) / (texture_height * crop.height_fraction()),
    );

    // Crop midpoint recentered to [-0.5, 0.5] of the scaled texture.
    let cx = (crop.left + crop.right) / 2.0 - 0.5;
    let cy = (crop.top + crop.bottom) / 2.0 - 0.5;

    let scaled_width = texture_width * scale;
    let scaled_height = texture_height * scale;

    LayerTransform {
        scale: scale as f32,
        translate_x: -(cx * scaled_width) as f32,
        translate_y: -(cy * scaled_height) as f32,
    }
}

/// Transform for the content layer: rotates by the crop angle and scales up
/// uniformly so the rotated rectangle's axis-aligned bounding box still covers
/// the unrotated `source_width × source_height` extent.
pub fn content_layer_transform(
    source_width: u32,
    source_height: u32,
    crop: Option<&CropState>,
) -> ContentTransform {
    let crop = match crop {
        Some(crop) if !crop.is_empty() => crop,
        _ => return ContentTransform::IDENTITY,
    };

    let degrees = crop.rotation;
    let radians = f64::from(degrees).to_radians();
    let sin = radians.sin().abs();
    let cos = radians.cos().abs();

    let w = f64::from(source_width);
    let h = f64::from(source_height);

    // W = w·|cos φ| + h·|sin φ|, H = w·|sin φ| + h·|cos φ|
    let bounding_width = w * cos + h * sin;
    let bounding_height = w * sin + h * cos;

    let scale = f64::max(bounding_width / w, bounding_height / h) as f32;

    ContentTransform {
        rotation: degrees,
        scale_x: scale,
        scale_y: scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn full_frame_crop_is_identity() {
        let crop = CropState::FULL_FRAME;
        assert!(crop.is_empty());
        let transform = image_layer_transform(400, 400, Some(&crop), 400, 400);
        assert_eq!(transform, LayerTransform::IDENTITY);
        let content = content_layer_transform(400, 400, Some(&crop));
        assert_eq!(content, ContentTransform::IDENTITY);
    }

    #[test]
    fn absent_crop_is_identity() {
        assert_eq!(
            image_layer_transform(1280, 720, None, 640, 360),
            LayerTransform::IDENTITY
        );
        assert_eq!(
            content_layer_transform(1280, 720, None),
            ContentTransform::IDENTITY
        );
    }

    #[test]
    fn centered_half_crop_scales_to_cover_target() {
        // Source 1000x1000, crop (0.25,0.25,0.75,0.75) => 500x500 region,
        // target 300x300 => scale 0.6, crop is centered so no translation.
        let crop = CropState::new(0.25, 0.25, 0.75, 0.75, 0.0);
        let transform = image_layer_transform(1000, 1000, Some(&crop), 300, 300);
        assert_close(transform.scale, 0.6);
        assert_close(transform.translate_x, 0.0);
        assert_close(transform.translate_y, 0.0);
    }

    #[test]
    fn off_center_crop_translates_midpoint_to_center() {
        // Crop occupies the left half: midpoint x = 0.25, recentered -0.25.
        let crop = CropState::new(0.0, 0.0, 0.5, 1.0, 0.0);
        let transform = image_layer_transform(1000, 500, Some(&crop), 500, 500);
        assert_close(transform.scale, 1.0);
        assert_close(transform.translate_x, 250.0);
        assert_close(transform.translate_y, 0.0);
    }

    #[test]
    fn wider_target_picks_the_larger_ratio() {
        let crop = CropState::new(0.0, 0.0, 0.5, 0.5, 0.0);
        // Horizontal ratio 600/500 = 1.2, vertical 300/500 = 0.6.
        let transform = image_layer_transform(1000, 1000, Some(&crop), 600, 300);
        assert_close(transform.scale, 1.2);
    }

    #[test]
    fn content_rotation_carries_crop_angle() {
        let crop = CropState::new(0.1, 0.1, 0.9, 0.9, 30.0);
        let transform = content_layer_transform(800, 600, Some(&crop));
        assert_close(transform.rotation, 30.0);
        assert_eq!(transform.scale_x, transform.scale_y);
        assert!(transform.scale_x > 1.0);
    }

    #[test]
    fn rotated_bounding_box_covers_viewport_at_any_angle() {
        for &(w, h) in &[(1000u32, 1000u32), (1600, 900), (320, 1200)] {
            let mut degrees = 0.0f32;
            while degrees < 360.0 {
                let crop = CropState::new(0.2, 0.2, 0.8, 0.8, degrees);
                let transform = content_layer_transform(w, h, Some(&crop));
                let radians = f64::from(degrees).to_radians();
                let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
                let scaled_w = f64::from(w) * f64::from(transform.scale_x);
                let scaled_h = f64::from(h) * f64::from(transform.scale_y);
                let bbox_w = scaled_w * cos + scaled_h * sin;
                let bbox_h = scaled_w * sin + scaled_h * cos;
                assert!(
                    bbox_w >= f64::from(w) - 1e-6 && bbox_h >= f64::from(h) - 1e-6,
                    "gap at {degrees}° for {w}x{h}: bbox {bbox_w}x{bbox_h}"
                );
                degrees += 7.0;
            }
        }
    }

    #[test]
    fn quarter_rotation_detection() {
        assert!(!is_quarter_rotated(0));
        assert!(is_quarter_rotated(90));
        assert!(!is_quarter_rotated(180));
        assert!(is_quarter_rotated(270));
        assert!(is_quarter_rotated(-90));
        assert!(!is_quarter_rotated(360));
    }
}
