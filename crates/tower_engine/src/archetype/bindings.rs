//! Animation parameter binding
//!
//! Animations never hold references into components. Binding captures the
//! current value of each named target; sampled values are written back by
//! name.

use crate::animation::ParamTarget;
use crate::components::{RenderComponent, TransformComponent};
use crate::ecs::Entity;
use crate::foundation::math::{Vec3, Vec4};

fn extend(v: &Vec3) -> Vec4 {
    Vec4::new(v.x, v.y, v.z, 0.0)
}

/// Bind every animation parameter of the entity and rewind the current one
///
/// Entities without a render component are left alone.
pub fn init_animations(entity: &mut Entity) {
    let transform = entity.get::<TransformComponent>().cloned();
    let Some(render) = entity.get_mut::<RenderComponent>() else {
        return;
    };
    let color = render.color;
    render.animator.bind(|target| match target {
        ParamTarget::Position => transform.as_ref().map(|t| extend(&t.pos)),
        ParamTarget::Rotation => transform.as_ref().map(|t| extend(&t.rotation)),
        ParamTarget::Scale => transform.as_ref().map(|t| extend(&t.scale)),
        ParamTarget::Color => Some(color),
        ParamTarget::Unbound => None,
    });
    render.animator.reset();
}

/// Write sampled animation values to their targets
pub fn apply_animation_values(entity: &mut Entity, values: &[(ParamTarget, Vec4)]) {
    for &(target, value) in values {
        match target {
            ParamTarget::Color => {
                if let Some(render) = entity.get_mut::<RenderComponent>() {
                    render.color = value;
                }
            }
            ParamTarget::Unbound => {}
            _ => {
                let Some(transform) = entity.get_mut::<TransformComponent>() else {
                    continue;
                };
                let field = match target {
                    ParamTarget::Position => &mut transform.pos,
                    ParamTarget::Rotation => &mut transform.rotation,
                    _ => &mut transform.scale,
                };
                *field = value.xyz();
            }
        }
    }
}

/// Restore every target of the current animation to its bind value and rewind
pub fn reverse_animations(entity: &mut Entity) {
    let Some(render) = entity.get_mut::<RenderComponent>() else {
        return;
    };
    let origins: Vec<_> = render
        .animator
        .current_animation()
        .into_iter()
        .flat_map(|animation| animation.params())
        .map(|param| (param.target(), param.origin()))
        .collect();
    render.animator.reset();
    apply_animation_values(entity, &origins);
}
