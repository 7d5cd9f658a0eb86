//! Free-fly camera with gimbal-lock-safe orientation.
//!
//! Orientation is a yaw angle around world Y and a tilt (pitch) angle, not a
//! full rotation hierarchy. Pitch is clamped strictly inside the poles so
//! the derived forward vector never degenerates; every reachable state
//! yields a well-defined view matrix.

use glam::{Mat4, Vec3};

/// Pitch stays strictly inside the open interval around ±π/2.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 * 0.99;

/// Held-input flags integrated by the camera once per frame.
///
/// Event producers only set these; they never touch camera state directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
}

/// Viewer position and orientation, integrated per frame.
pub struct FlyCamera {
    pub position: Vec3,
    /// Rotation around world Y, radians.
    pub yaw: f32,
    /// Tilt above/below the horizon, radians, clamped to [`PITCH_LIMIT`].
    pub pitch: f32,
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub look_speed: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 4.0,
            look_speed: 1.5,
            fov_y: 45.0f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }

    /// Unit forward vector for the current orientation.
    ///
    /// Sign convention: at zero yaw and pitch the camera looks down −Z;
    /// positive yaw turns toward +X.
    pub fn forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vec3::new(pitch_cos * yaw_sin, pitch_sin, -pitch_cos * yaw_cos).normalize()
    }

    /// Unit right vector for the current orientation.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Integrates one frame of held input.
    ///
    /// Pitch is clamped before the basis is derived, so the forward vector
    /// is never computed at a singular tilt. Movement uses the basis from
    /// the start of the frame; rotation applied here only affects the next
    /// frame's basis.
    pub fn update(&mut self, input: &CameraInput, delta_time: f32) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize();

        let step = self.move_speed * delta_time;
        if input.forward {
            self.position += forward * step;
        }
        if input.backward {
            self.position -= forward * step;
        }
        if input.right {
            self.position += right * step;
        }
        if input.left {
            self.position -= right * step;
        }
        if input.up {
            self.position += Vec3::Y * step;
        }
        if input.down {
            self.position -= Vec3::Y * step;
        }

        let turn = self.look_speed * delta_time;
        if input.yaw_right {
            self.yaw += turn;
        }
        if input.yaw_left {
            self.yaw -= turn;
        }
        if input.pitch_up {
            self.pitch += turn;
        }
        if input.pitch_down {
            self.pitch -= turn;
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Points the camera at a target by solving yaw and pitch for it.
    ///
    /// Pitch is clamped, so a target straight above or below ends up at the
    /// tilt limit instead of a singular orientation.
    pub fn look_toward(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.x.atan2(-dir.z);
        self.pitch = dir.y.asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// View matrix, derived fresh every call.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Projection matrix, derived fresh every call since the aspect ratio
    /// can change on window resize.
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, aspect_ratio, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELD_FORWARD: CameraInput = CameraInput {
        forward: true,
        backward: false,
        left: false,
        right: false,
        up: false,
        down: false,
        yaw_left: false,
        yaw_right: false,
        pitch_up: false,
        pitch_down: false,
    };

    #[test]
    fn forward_is_negative_z_at_rest() {
        let camera = FlyCamera::new(Vec3::ZERO);
        assert!((camera.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn moving_forward_one_second_at_unit_speed() {
        let mut camera = FlyCamera::new(Vec3::new(0.0, 0.0, 10.0));
        camera.move_speed = 1.0;
        camera.update(&HELD_FORWARD, 1.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-6);
    }

    #[test]
    fn pitch_stays_clamped_under_sustained_input() {
        let mut camera = FlyCamera::new(Vec3::ZERO);
        let input = CameraInput {
            pitch_up: true,
            ..CameraInput::default()
        };
        for _ in 0..10_000 {
            camera.update(&input, 0.1);
            assert!(camera.pitch <= PITCH_LIMIT);
        }

        let input = CameraInput {
            pitch_down: true,
            ..CameraInput::default()
        };
        for _ in 0..10_000 {
            camera.update(&input, 0.1);
            assert!(camera.pitch >= -PITCH_LIMIT);
        }
    }

    #[test]
    fn forward_is_unit_length_for_reachable_states() {
        let mut camera = FlyCamera::new(Vec3::ZERO);
        let inputs = [
            CameraInput {
                yaw_right: true,
                pitch_up: true,
                forward: true,
                ..CameraInput::default()
            },
            CameraInput {
                yaw_left: true,
                pitch_down: true,
                left: true,
                ..CameraInput::default()
            },
        ];
        for step in 0..1_000 {
            camera.update(&inputs[step % 2], 0.037);
            assert!((camera.forward().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn look_toward_faces_the_target() {
        let mut camera = FlyCamera::new(Vec3::new(2.0, 2.0, 5.0));
        camera.look_toward(Vec3::ZERO);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn view_matrix_is_finite_under_extreme_input() {
        let mut camera = FlyCamera::new(Vec3::ZERO);
        let input = CameraInput {
            pitch_up: true,
            yaw_right: true,
            ..CameraInput::default()
        };
        // Huge delta steps would overshoot the pole without clamping.
        for _ in 0..100 {
            camera.update(&input, 1_000.0);
        }
        let view = camera.view();
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rotation_affects_the_next_frame_not_the_current_one() {
        let mut camera = FlyCamera::new(Vec3::ZERO);
        camera.move_speed = 1.0;
        let input = CameraInput {
            forward: true,
            yaw_right: true,
            ..CameraInput::default()
        };
        camera.update(&input, 1.0);
        // The move this frame used the pre-rotation forward vector.
        assert!((camera.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        assert!(camera.yaw > 0.0);
    }
}
