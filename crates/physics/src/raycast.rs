//! Raycasting for grab guards and UI queries.

use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit, optionally ignoring one body
    /// (the prop being driven).
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let mut filter = QueryFilter::default();
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Check if there's a clear line of sight between two points against static
    /// geometry only.
    pub fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let direction = to - from;
        let distance = direction.length();
        if distance < 0.001 {
            return true;
        }
        let direction = direction / distance;
        let ray = Ray::new(point![from.x, from.y, from.z], vector![direction.x, direction.y, direction.z]);
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                distance,
                true,
                QueryFilter::exclude_dynamic(),
            )
            .is_none()
    }

    /// Wall-penetration guard for the grab seek: shorten a seek target so a
    /// driven prop stops `margin` short of any static surface between its
    /// current position and the hold point. Dynamic bodies (other props, the
    /// held prop itself) do not block the seek.
    pub fn clamp_seek_target(
        &self,
        from: Vec3,
        target: Vec3,
        margin: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Vec3 {
        let direction = target - from;
        let distance = direction.length();
        if distance < 1e-4 {
            return target;
        }
        let direction = direction / distance;
        let ray = Ray::new(point![from.x, from.y, from.z], vector![direction.x, direction.y, direction.z]);
        let mut filter = QueryFilter::exclude_dynamic();
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }
        match self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            distance,
            true,
            filter,
        ) {
            Some((_, toi)) => from + direction * (toi - margin).max(0.0),
            None => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use crate::PropBodyParams;

    #[test]
    fn raycast_hits_static_wall() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, 1.0, -3.0), 0.0, Vec3::new(2.0, 2.0, 0.1));
        world.update_query_pipeline();
        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 10.0, None)
            .expect("wall should be hit");
        assert!((hit.distance - 2.9).abs() < 1e-3);
        assert!(hit.normal.z > 0.9);
    }

    #[test]
    fn seek_target_stops_short_of_wall() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, 1.0, -3.0), 0.0, Vec3::new(2.0, 2.0, 0.1));
        world.update_query_pipeline();
        let from = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(0.0, 1.0, -5.0);
        let clamped = world.clamp_seek_target(from, target, 0.05, None);
        assert!(clamped.z > -2.95);
        // Open direction: target is untouched.
        let open = world.clamp_seek_target(from, Vec3::new(0.0, 1.0, 5.0), 0.05, None);
        assert_eq!(open, Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn seek_guard_ignores_other_props() {
        let mut world = PhysicsWorld::new();
        world.add_prop_body(
            Vec3::new(0.0, 1.0, -2.0),
            Quat::IDENTITY,
            Vec3::splat(0.2),
            PropBodyParams::default(),
        );
        world.update_query_pipeline();
        let from = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(0.0, 1.0, -4.0);
        assert_eq!(world.clamp_seek_target(from, target, 0.05, None), target);
    }
}
