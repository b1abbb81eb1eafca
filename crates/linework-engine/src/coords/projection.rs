use nalgebra::{Matrix4, Point3, Vector3};

use super::Viewport;

/// Orthographic projection from logical pixels to clip space.
///
/// Maps `(0, 0)` to the top-left corner and `(width, height)` to the
/// bottom-right corner (+Y down). Depth range is `[-1, 1]`, so `z = 0`
/// content lands at clip depth 0.
pub fn ortho_top_left(viewport: Viewport) -> Matrix4<f32> {
    let vp = viewport.clamped();
    Matrix4::new_orthographic(0.0, vp.width, vp.height, 0.0, -1.0, 1.0)
}

/// View transform looking from the origin down the forward axis (-Z, up +Y).
///
/// 2D content is authored directly in view space, so this is the identity;
/// it is kept explicit so the effect carries a real view transform.
pub fn forward_view() -> Matrix4<f32> {
    Matrix4::look_at_rh(
        &Point3::origin(),
        &Point3::new(0.0, 0.0, -1.0),
        &Vector3::y(),
    )
}
