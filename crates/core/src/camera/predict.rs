//! First-order camera pose prediction
//!
//! Constant-velocity extrapolation from the two most recent poses: the
//! translation delta is applied forward once more, and the orientation delta
//! between the two poses is composed again onto the current orientation.
//! The view-to-clip matrix is passed through unchanged (not predicted).

use nalgebra::{Matrix3, Matrix4, Vector3};

use super::{CameraData, PredictedCameraData};

/// Invert a rigid transform (orthonormal rotation + translation) without a
/// general 4x4 inverse.
fn orthonormal_inverse(m: &Matrix4<f32>) -> Matrix4<f32> {
    let r: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).transpose();
    let t: Vector3<f32> = m.fixed_view::<3, 1>(0, 3).into_owned();

    let mut out = Matrix4::identity();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    out.fixed_view_mut::<3, 1>(0, 3).copy_from(&(-(r * t)));
    out
}

/// Extrapolate the next frame's pose from the current one and the previous
/// frame's world-to-view matrix.
pub fn predict_camera(current: &CameraData, prev_world_to_view: &Matrix4<f32>) -> PredictedCameraData {
    let view_to_world = orthonormal_inverse(&current.world_to_view);
    let prev_view_to_world = orthonormal_inverse(prev_world_to_view);

    let translation: Vector3<f32> = view_to_world.fixed_view::<3, 1>(0, 3).into_owned();
    let prev_translation: Vector3<f32> = prev_view_to_world.fixed_view::<3, 1>(0, 3).into_owned();
    let predicted_translation = translation + (translation - prev_translation);

    let rotation: Matrix3<f32> = view_to_world.fixed_view::<3, 3>(0, 0).into_owned();
    let prev_rotation: Matrix3<f32> = prev_view_to_world.fixed_view::<3, 3>(0, 0).into_owned();
    // Orientation delta between the two poses, applied once more.
    let delta = rotation * prev_rotation.transpose();
    let predicted_rotation = delta * rotation;

    let mut predicted_view_to_world = Matrix4::identity();
    predicted_view_to_world
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&predicted_rotation);
    predicted_view_to_world
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&predicted_translation);

    PredictedCameraData {
        world_to_view: orthonormal_inverse(&predicted_view_to_world),
        // TODO: predict view-to-clip once jittered projections are plumbed
        // through; passthrough matches what consumers expect today.
        view_to_clip: current.view_to_clip,
    }
}
