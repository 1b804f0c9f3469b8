//! Animations and the per-entity animator

use serde_json::{json, Value};

use super::param_animation::{Easing, Keyframe, ParamAnimation, ParamTarget};
use crate::foundation::json::JsonExt;
use crate::foundation::math::{Vec3, Vec4};

/// A named set of parameter animations played together
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    layer: String,
    looped: bool,
    params: Vec<ParamAnimation>,
}

impl Animation {
    /// Create an empty looping animation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: "DEFAULT".to_string(),
            looped: true,
            params: Vec::new(),
        }
    }

    /// Animation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layer name
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Set the layer name
    pub fn set_layer(&mut self, layer: impl Into<String>) {
        self.layer = layer.into();
    }

    /// Whether the animation restarts when every parameter finishes
    pub fn is_loop(&self) -> bool {
        self.looped
    }

    /// Enable or disable looping
    pub fn set_loop(&mut self, looped: bool) {
        self.looped = looped;
    }

    /// Add a parameter animation, rewound
    pub fn add_param(&mut self, mut param: ParamAnimation) {
        param.reset();
        self.params.push(param);
    }

    /// Parameter animations
    pub fn params(&self) -> &[ParamAnimation] {
        &self.params
    }

    /// Parameter animations, mutably
    pub fn params_mut(&mut self) -> &mut [ParamAnimation] {
        &mut self.params
    }

    /// Advance every parameter, restarting when all are done and looping
    pub fn update(&mut self, dt: f32) {
        let mut running = false;
        for param in &mut self.params {
            running |= param.update(dt);
        }
        if !running && self.looped {
            self.reset();
        }
    }

    /// Rewind every parameter
    pub fn reset(&mut self) {
        for param in &mut self.params {
            param.reset();
        }
    }
}

/// Animation player attached to a render component
#[derive(Debug, Default, PartialEq)]
pub struct Animator {
    animations: Vec<Animation>,
    current: Option<usize>,
}

impl Clone for Animator {
    fn clone(&self) -> Self {
        Self {
            animations: self.animations.clone(),
            current: if self.animations.is_empty() { None } else { Some(0) },
        }
    }
}

impl Animator {
    /// Empty animator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animation
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Remove an animation by name, stopping it if current
    pub fn remove_animation(&mut self, name: &str) -> Option<Animation> {
        let index = self.animations.iter().position(|a| a.name() == name)?;
        match self.current {
            Some(current) if current == index => self.current = None,
            Some(current) if current > index => self.current = Some(current - 1),
            _ => {}
        }
        Some(self.animations.remove(index))
    }

    /// Animation by name
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name() == name)
    }

    /// All animations
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// All animations, mutably
    pub fn animations_mut(&mut self) -> &mut [Animation] {
        &mut self.animations
    }

    /// Number of animations
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Whether there are no animations
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Switch to an animation
    ///
    /// Returns `true` when it is already playing. An unknown name is logged
    /// and returns `false`. The previous animation is rewound first so it
    /// releases its targets.
    pub fn play(&mut self, name: &str) -> bool {
        if self.is_playing_named(name) {
            return true;
        }
        let Some(index) = self.animations.iter().position(|a| a.name() == name) else {
            log::info!("Can't play animation \"{name}\": this animation does not exist");
            return false;
        };
        if let Some(current) = self.current_mut() {
            current.reset();
        }
        self.current = Some(index);
        true
    }

    /// Whether an animation is current
    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the named animation is current
    pub fn is_playing_named(&self, name: &str) -> bool {
        self.current_animation().is_some_and(|a| a.name() == name)
    }

    /// Current animation
    pub fn current_animation(&self) -> Option<&Animation> {
        self.current.and_then(|i| self.animations.get(i))
    }

    fn current_mut(&mut self) -> Option<&mut Animation> {
        self.current.and_then(|i| self.animations.get_mut(i))
    }

    /// Rewind the current animation; it stays current
    pub fn stop(&mut self) {
        self.reset();
    }

    /// Rewind the current animation
    pub fn reset(&mut self) {
        if let Some(current) = self.current_mut() {
            current.reset();
        }
    }

    /// Advance the current animation
    pub fn update(&mut self, dt: f32) {
        if let Some(current) = self.current_mut() {
            current.update(dt);
        }
    }

    /// Capture the bind value of every parameter of every animation
    pub fn bind(&mut self, mut origin: impl FnMut(ParamTarget) -> Option<Vec4>) {
        for animation in &mut self.animations {
            for param in animation.params_mut() {
                if let Some(value) = origin(param.target()) {
                    param.bind(value);
                }
            }
        }
    }

    /// Sampled values of the current animation's bound parameters
    pub fn samples(&self) -> impl Iterator<Item = (ParamTarget, Vec4)> + '_ {
        self.current_animation()
            .into_iter()
            .flat_map(|a| a.params())
            .filter(|p| p.target() != ParamTarget::Unbound)
            .map(|p| (p.target(), p.sample()))
    }

    /// Parse the `animations` array of a render component
    pub fn from_json(json: &Value) -> Self {
        let mut animator = Self::new();
        let Some(animations) = json.as_array() else {
            return animator;
        };

        for entry in animations {
            let mut animation = Animation::new(entry.get_string("name", "animation"));
            animation.set_layer(entry.get_string("layer", "DEFAULT"));
            animation.set_loop(entry.get_bool("loop", true));

            for param_json in entry.get_object("params").as_array().into_iter().flatten() {
                let mut param = ParamAnimation::new(param_json.get_string("name", ""));
                let is_color = param.target() == ParamTarget::Color;
                for frame in param_json.get_object("frames").as_array().into_iter().flatten() {
                    let value = if is_color {
                        frame.get_vec4("value", Vec4::zeros())
                    } else {
                        frame.get_vec3("value", Vec3::zeros()).push(0.0)
                    };
                    param.add_keyframe(Keyframe {
                        time: frame.get_f32("time", 1.0),
                        value,
                        easing: Easing::from_name(&frame.get_string("easing", "NONE")),
                    });
                }
                animation.add_param(param);
            }
            animator.add_animation(animation);
        }

        if !animator.is_empty() {
            animator.current = Some(0);
        }
        animator
    }

    /// Serialize into the `animations` array of a render component
    pub fn to_json(&self) -> Value {
        let animations: Vec<Value> = self
            .animations
            .iter()
            .map(|animation| {
                let params: Vec<Value> = animation
                    .params()
                    .iter()
                    .map(|param| {
                        let frames: Vec<Value> = param
                            .frames()
                            .iter()
                            .map(|frame| {
                                let mut out = json!({
                                    "time": frame.time,
                                    "easing": frame.easing.name(),
                                });
                                if param.target() == ParamTarget::Color {
                                    out.set_vec4("value", &frame.value);
                                } else {
                                    out.set_vec3("value", &frame.value.xyz());
                                }
                                out
                            })
                            .collect();
                        json!({ "name": param.name(), "frames": frames })
                    })
                    .collect();
                json!({
                    "name": animation.name(),
                    "layer": animation.layer(),
                    "loop": animation.is_loop(),
                    "params": params,
                })
            })
            .collect();
        Value::Array(animations)
    }
}
