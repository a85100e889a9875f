use glam::Vec3;

const SQUARE_WEIGHT: f32 = 0.35;
const QUARTIC_WEIGHT: f32 = 0.25;

/// Hemispherical kernel centred on `lobe`, evaluated towards `w`.
///
/// Zero whenever `w` is on or behind the plane orthogonal to `lobe`.
pub fn eval_lobe(lobe: Vec3, w: Vec3) -> f32 {
    let cos_theta = lobe.dot(w).max(0.0);
    if cos_theta == 0.0 {
        return 0.0;
    }
    let cos2 = cos_theta * cos_theta;
    SQUARE_WEIGHT * cos2 + QUARTIC_WEIGHT * cos2 * cos2
}
