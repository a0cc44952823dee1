//! Pairwise AABB collision detection and impulse resolution.
//!
//! Every pass tests one entity against every other registered entity; there is
//! no broad phase.
//!
//! Resolution is deliberately asymmetric: only the entity being processed (`i`)
//! has its displacement reverted and its bounce and friction applied. The other
//! entity (`j`) at most takes the impulse as its velocity when it is pushable.
//! Which entity plays `i` depends on registry order.

use glam::Vec2;

use crate::api::context::ScriptCtx;
use crate::api::script::Hook;
use crate::components::entity::Entity;
use crate::core::fault::FaultLog;
use crate::core::physics::{self, Axis};
use crate::systems::dispatch::{dispatch, pair_mut};

/// Notify both participants of an overlap: `i` about `j`, then `j` about `i`.
fn notify(
    entities: &mut [Entity],
    i: usize,
    j: usize,
    contact: Vec2,
    impulse: Option<Vec2>,
    ctx: &mut ScriptCtx,
    faults: &mut FaultLog,
) {
    for (me, other) in [(i, j), (j, i)] {
        let (entity, other) = pair_mut(entities, me, other);
        dispatch(entity, Hook::Intersection, ctx, faults, |s, e, c| {
            s.on_intersection(e, other, contact, impulse, c)
        });
    }
}

/// Whether an overlap between two bodies gets an impulse.
fn resolves(a: &Entity, b: &Entity) -> bool {
    !a.body.intangible && !b.body.intangible && !(a.body.is_static && b.body.is_static)
}

/// Run the collision pass for entity `i` along `axis`, after its `axis`
/// displacement for this tick has been applied.
pub fn resolve_axis(
    entities: &mut [Entity],
    i: usize,
    axis: Axis,
    dt: f32,
    ctx: &mut ScriptCtx,
    faults: &mut FaultLog,
) {
    for j in 0..entities.len() {
        if j == i {
            continue;
        }

        let Some(contact) = entities[i].shape.intersect(&entities[j].shape) else {
            continue;
        };

        notify(entities, i, j, contact, None, ctx, faults);

        // Hooks above may have changed either body.
        if !resolves(&entities[i], &entities[j]) {
            continue;
        }

        let mean = (entities[i].body.velocity + entities[j].body.velocity) / 2.0;
        let impulse = axis.project(mean);

        notify(entities, i, j, contact, Some(impulse), ctx, faults);

        let (entity, other) = pair_mut(entities, i, j);
        physics::revert(&mut entity.shape, &entity.body, axis, dt);
        let push = other.body.pushable && !other.body.is_static;

        if push {
            *axis.of_mut(&mut entities[j].body.velocity) = axis.of(impulse);
        }

        let body = &mut entities[i].body;
        let along = axis.of_mut(&mut body.velocity);
        *along = -*along * body.bounciness;
        let friction = body.friction;
        let across = axis.other().of_mut(&mut body.velocity);
        *across -= *across * friction;
    }
}
