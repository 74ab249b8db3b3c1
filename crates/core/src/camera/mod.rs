//! Per-frame camera data exchange
//!
//! The simulation thread hands camera transforms to render-side consumers
//! running a few frames behind through a [`FrameDataChannel`]. A predicted
//! variant is derived - not independently produced - from the two most
//! recent poses via constant-velocity extrapolation, and only once a
//! consumer has asked for predictions at least once.

mod channel;
mod predict;

pub use channel::FrameDataChannel;
pub use predict::predict_camera;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nalgebra::Matrix4;
use parking_lot::Mutex;

use prism_sdk::{ApiError, FrameToken};

use crate::config::CameraConfig;

/// Camera transforms for one frame, as constructed by the simulation thread
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    pub frame: FrameToken,
    pub world_to_view: Matrix4<f32>,
    pub view_to_clip: Matrix4<f32>,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            frame: FrameToken(0),
            world_to_view: Matrix4::identity(),
            view_to_clip: Matrix4::identity(),
        }
    }
}

/// Constant-velocity extrapolation of [`CameraData`] one frame forward
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedCameraData {
    pub world_to_view: Matrix4<f32>,
    pub view_to_clip: Matrix4<f32>,
}

impl Default for PredictedCameraData {
    fn default() -> Self {
        Self {
            world_to_view: Matrix4::identity(),
            view_to_clip: Matrix4::identity(),
        }
    }
}

/// Simulation-to-render camera handoff plus derived predictions.
///
/// Owns two channels (raw and predicted) and the previous frame's matrices
/// the prediction is derived from.
pub struct CameraStream {
    sim: FrameDataChannel<CameraData>,
    predicted: FrameDataChannel<PredictedCameraData>,
    /// world-to-view of the most recently inserted frame
    prev_world_to_view: Mutex<Option<Matrix4<f32>>>,
    /// Latched on the first predicted-data request; prediction work is
    /// skipped entirely until someone wants it
    predict: AtomicBool,
}

impl CameraStream {
    pub fn new(config: &CameraConfig) -> Self {
        let timeout = Duration::from_millis(config.wait_timeout_ms);
        Self {
            sim: FrameDataChannel::new(
                "camera",
                config.capacity,
                config.startup_no_wait_frames,
                timeout,
            ),
            predicted: FrameDataChannel::new(
                "predicted camera",
                config.capacity,
                config.startup_no_wait_frames,
                timeout,
            ),
            prev_world_to_view: Mutex::new(None),
            predict: AtomicBool::new(false),
        }
    }

    /// Ingest camera data for a frame from the simulation thread.
    ///
    /// Derives and stores the predicted pose first (when enabled and a
    /// previous pose exists), then stores the raw data and remembers the
    /// pose for the next derivation.
    pub fn insert_camera_data(&self, frame: FrameToken, data: CameraData) {
        let mut prev = self.prev_world_to_view.lock();

        if self.predict.load(Ordering::Acquire) && frame.index() > 0 {
            if let Some(prev_world_to_view) = *prev {
                let predicted = predict_camera(&data, &prev_world_to_view);
                self.predicted.insert(frame, predicted);
            }
        }

        let world_to_view = data.world_to_view;
        self.sim.insert(frame, data);
        *prev = Some(world_to_view);
    }

    /// Camera data for exactly `frame`, waiting within the channel's budget
    pub fn camera_data(&self, frame: FrameToken) -> Result<CameraData, ApiError> {
        self.sim.get(frame).ok_or_else(|| {
            tracing::warn!("could not get camera data for frame {frame}");
            ApiError::MissingCameraData(frame)
        })
    }

    /// Predicted camera data for `frame`; enables prediction from now on
    pub fn predicted_camera_data(&self, frame: FrameToken) -> Result<PredictedCameraData, ApiError> {
        self.predict.store(true, Ordering::Release);
        self.predicted.get(frame).ok_or_else(|| {
            tracing::warn!("could not get predicted camera data for frame {frame}");
            ApiError::MissingCameraData(frame)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn stream() -> CameraStream {
        CameraStream::new(&CameraConfig {
            capacity: 4,
            startup_no_wait_frames: 5,
            wait_timeout_ms: 50,
        })
    }

    fn cam(frame: u64, x: f32) -> CameraData {
        let mut world_to_view = Matrix4::identity();
        world_to_view
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&Vector3::new(-x, 0.0, 0.0));
        CameraData {
            frame: FrameToken(frame),
            world_to_view,
            view_to_clip: Matrix4::identity(),
        }
    }

    #[test]
    fn roundtrip_per_frame() {
        let s = stream();
        for f in 1..=4 {
            s.insert_camera_data(FrameToken(f), cam(f, f as f32));
        }
        let got = s.camera_data(FrameToken(3)).unwrap();
        assert_eq!(got, cam(3, 3.0));
    }

    #[test]
    fn missing_frame_is_typed_error() {
        let s = stream();
        let err = s.camera_data(FrameToken(2)).unwrap_err();
        assert_eq!(err, ApiError::MissingCameraData(FrameToken(2)));
    }

    #[test]
    fn prediction_disabled_until_first_request() {
        let s = stream();
        s.insert_camera_data(FrameToken(1), cam(1, 1.0));
        s.insert_camera_data(FrameToken(2), cam(2, 2.0));

        // Nothing was derived yet; the first request enables the latch but
        // finds no data for already-inserted frames.
        assert!(s.predicted_camera_data(FrameToken(2)).is_err());

        s.insert_camera_data(FrameToken(3), cam(3, 3.0));
        let predicted = s.predicted_camera_data(FrameToken(3)).unwrap();
        // Constant velocity: x moved 2 -> 3, predicted pose sits at x = 4.
        let expected = cam(0, 4.0);
        assert_relative_eq!(predicted.world_to_view, expected.world_to_view, epsilon = 1e-5);
    }

    #[test]
    fn first_frame_never_produces_prediction() {
        let s = stream();
        let _ = s.predicted_camera_data(FrameToken(1));
        s.insert_camera_data(FrameToken(1), cam(1, 1.0));
        // Frame 1 had no previous pose to derive from.
        assert!(s.predicted_camera_data(FrameToken(1)).is_err());
    }
}
