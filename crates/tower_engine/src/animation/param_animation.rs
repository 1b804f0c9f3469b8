//! Parameter animation

use crate::foundation::math::{lerp, Vec4};

/// Interpolation curve between two keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear
    #[default]
    None,
    /// Quadratic, slow start
    EaseIn,
    /// Quadratic, slow end
    EaseOut,
}

impl Easing {
    /// Parse a JSON name, defaulting to linear
    pub fn from_name(name: &str) -> Self {
        match name {
            "EASE_IN" => Self::EaseIn,
            "EASE_OUT" => Self::EaseOut,
            _ => Self::None,
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::EaseIn => "EASE_IN",
            Self::EaseOut => "EASE_OUT",
        }
    }

    /// Map linear progress in `[0, 1]` through the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::None => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// One keyframe: reach `value` after `time` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Duration from the previous keyframe
    pub time: f32,
    /// Target value; the `w` component is unused for 3D parameters
    pub value: Vec4,
    /// Curve used to reach the value
    pub easing: Easing,
}

/// Field driven by a parameter animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
    /// Transform position, animated relative to its bind value
    Position,
    /// Transform rotation in degrees, relative
    Rotation,
    /// Transform scale, relative
    Scale,
    /// Render color, absolute
    Color,
    /// Unknown parameter name; sampled but never applied
    Unbound,
}

impl ParamTarget {
    /// Resolve a parameter name
    pub fn from_name(name: &str) -> Self {
        match name {
            "position" => Self::Position,
            "rotation" => Self::Rotation,
            "scale" => Self::Scale,
            "color" => Self::Color,
            _ => Self::Unbound,
        }
    }

    /// Keyframe values are offsets added to the bind value
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::Position | Self::Rotation | Self::Scale)
    }
}

/// Keyframes for a single parameter plus playback state
#[derive(Debug, Clone, PartialEq)]
pub struct ParamAnimation {
    name: String,
    frames: Vec<Keyframe>,
    target: ParamTarget,
    origin: Vec4,
    current_frame: usize,
    elapsed: f32,
}

impl ParamAnimation {
    /// Create an unbound parameter animation
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            target: ParamTarget::from_name(&name),
            name,
            frames: Vec::new(),
            origin: Vec4::zeros(),
            current_frame: 0,
            elapsed: 0.0,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target resolved from the name
    pub fn target(&self) -> ParamTarget {
        self.target
    }

    /// Keyframes in playback order
    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// Append a keyframe
    pub fn add_keyframe(&mut self, frame: Keyframe) {
        self.frames.push(frame);
    }

    /// Capture the current value of the target
    pub fn bind(&mut self, origin: Vec4) {
        self.origin = origin;
    }

    /// Value captured at bind time
    pub fn origin(&self) -> Vec4 {
        self.origin
    }

    /// Whether every keyframe has been played
    pub fn is_finished(&self) -> bool {
        self.current_frame >= self.frames.len()
    }

    /// Advance by `dt` seconds; returns `true` while frames remain
    pub fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        while let Some(frame) = self.frames.get(self.current_frame) {
            if self.elapsed < frame.time {
                break;
            }
            self.elapsed -= frame.time;
            self.current_frame += 1;
        }
        if self.is_finished() {
            self.elapsed = 0.0;
        }
        !self.is_finished()
    }

    /// Rewind to the first keyframe
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.elapsed = 0.0;
    }

    fn frame_value(&self, index: Option<usize>) -> Vec4 {
        match index.and_then(|i| self.frames.get(i)) {
            Some(frame) => frame.value,
            None if self.target.is_relative() => Vec4::zeros(),
            None => self.origin,
        }
    }

    /// Current value of the target
    pub fn sample(&self) -> Vec4 {
        let value = match self.frames.get(self.current_frame) {
            Some(frame) => {
                let start = self.frame_value(self.current_frame.checked_sub(1));
                let t = if frame.time > 0.0 { self.elapsed / frame.time } else { 1.0 };
                lerp(&start, &frame.value, frame.easing.apply(t))
            }
            None => self.frame_value(self.frames.len().checked_sub(1)),
        };

        if self.target.is_relative() {
            self.origin + value
        } else {
            value
        }
    }
}
