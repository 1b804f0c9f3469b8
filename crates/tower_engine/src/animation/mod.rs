//! Keyframe animation
//!
//! An [`Animator`] owns named [`Animation`]s; each animation drives several
//! [`ParamAnimation`]s, one per animated parameter. Parameters are bound to
//! their target by name when an entity is instantiated, and the sampled
//! values are written back to the entity by the animation system.

mod animator;
mod param_animation;

pub use animator::{Animation, Animator};
pub use param_animation::{Easing, Keyframe, ParamAnimation, ParamTarget};
