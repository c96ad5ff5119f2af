use glam::Vec3;

/// Half-line used for picking. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Slab test. Returns the ray parameter where the ray first touches the box,
    /// or the exit point when the origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if ray.direction == Vec3::ZERO {
            return None;
        }

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Parallel to this slab
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        let t = if t_min >= 0.0 { t_min } else { t_max };
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_center_size(Vec3::ZERO, Vec3::splat(1.0))
    }

    #[test]
    fn test_hit_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(ray.direction, Vec3::NEG_Z, "direction must be normalized");

        let t = unit_box().intersect_ray(&ray).expect("should hit");
        assert!((t - 4.5).abs() < 1e-5);
        assert!(ray.at(t).abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-5));
    }

    #[test]
    fn test_miss_and_behind() {
        let aside = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(unit_box().intersect_ray(&aside), None);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(unit_box().intersect_ray(&away), None);
    }

    #[test]
    fn test_origin_inside_hits_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = unit_box().intersect_ray(&ray).expect("inside should hit");
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert_eq!(unit_box().intersect_ray(&ray), None);
    }

    #[test]
    fn test_diagonal_hit() {
        let ray = Ray::new(Vec3::splat(3.0), Vec3::splat(-1.0));
        let t = unit_box().intersect_ray(&ray).expect("diagonal should hit");
        assert!(ray.at(t).abs_diff_eq(Vec3::splat(0.5), 1e-4));
    }
}
