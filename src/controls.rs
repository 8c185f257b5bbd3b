//! Values exposed on the debug-control panel.

use std::ops::RangeInclusive;

pub const DISPLACEMENT_RANGE: RangeInclusive<f32> = 0.0..=5.0;
pub const DISPLACEMENT_STEP: f32 = 0.1;
pub const DEFAULT_DISPLACEMENT: f32 = 2.5;

/// Displacement scalar and wireframe toggle fed to the depth material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderControls {
    displacement: f32,
    pub wireframe: bool,
}

impl Default for ShaderControls {
    fn default() -> Self {
        Self {
            displacement: DEFAULT_DISPLACEMENT,
            wireframe: false,
        }
    }
}

impl ShaderControls {
    pub fn displacement(&self) -> f32 {
        self.displacement
    }

    /// Clamp into [0, 5] and snap to the slider step. NaN resets to the default.
    pub fn set_displacement(&mut self, value: f32) {
        self.displacement = clamp_displacement(value);
    }
}

pub fn clamp_displacement(value: f32) -> f32 {
    if value.is_nan() {
        return DEFAULT_DISPLACEMENT;
    }
    let (min, max) = (*DISPLACEMENT_RANGE.start(), *DISPLACEMENT_RANGE.end());
    let snapped = (value / DISPLACEMENT_STEP).round() * DISPLACEMENT_STEP;
    snapped.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ShaderControls::default();
        assert_eq!(c.displacement(), 2.5);
        assert!(!c.wireframe);
    }

    #[test]
    fn displacement_is_clamped() {
        let mut c = ShaderControls::default();
        c.set_displacement(7.3);
        assert_eq!(c.displacement(), 5.0);
        c.set_displacement(-1.0);
        assert_eq!(c.displacement(), 0.0);
        c.set_displacement(f32::INFINITY);
        assert_eq!(c.displacement(), 5.0);
        c.set_displacement(f32::NAN);
        assert_eq!(c.displacement(), DEFAULT_DISPLACEMENT);
    }

    #[test]
    fn displacement_snaps_to_step() {
        let mut c = ShaderControls::default();
        c.set_displacement(1.234);
        assert!((c.displacement() - 1.2).abs() < 1e-5);
    }
}
