use crate::geometry::MaskRect;

/// The opaque rectangles masking everything outside the visible crop window:
/// up to four strips (left/right/above/below) around a `cropped_width ×
/// cropped_height` window centered at (`center_x`, `center_y`). Purely
/// presentation geometry; the overlay renderer fills them black.
pub fn mask_rectangles(
    view_width: i32,
    view_height: i32,
    cropped_width: i32,
    cropped_height: i32,
    center_x: i32,
    center_y: i32,
) -> Vec<MaskRect> {
    let left = center_x - cropped_width / 2;
    let right = left + cropped_width;
    let top = center_y - cropped_height / 2;
    let bottom = top + cropped_height;

    let mut rects = Vec::with_capacity(4);
    if left > 0 {
        rects.push(MaskRect::new(0, top, left, bottom));
    }
    if right < view_width {
        rects.push(MaskRect::new(right, top, view_width, bottom));
    }
    if top > 0 {
        rects.push(MaskRect::new(0, 0, view_width, top));
    }
    if bottom < view_height {
        rects.push(MaskRect::new(0, bottom, view_width, view_height));
    }
    rects
}
