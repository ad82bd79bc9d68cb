use glam::{Mat4, Quat, Vec2, Vec3};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub u64);

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn to_mat4_scaled(&self, scale: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(scale, self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<I>(points: I) -> Option<Aabb>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for point in iter {
            aabb.min = aabb.min.min(point);
            aabb.max = aabb.max.max(point);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Slab test. Returns the entry distance along the ray, 0.0 when the
    /// origin is already inside.
    pub fn intersect_ray(&self, ray: Ray) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.dir[axis];
            if dir.abs() <= 1.0e-8 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// A tracked flat surface. The boundary polygon lives in the plane's local
/// frame: x/z across the surface, y along the normal.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPlane {
    pub id: PlaneId,
    pub pose: Pose,
    pub polygon: Vec<Vec2>,
}

impl TrackedPlane {
    pub fn normal(&self) -> Vec3 {
        self.pose.up()
    }

    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.pose.inverse_transform_point(world)
    }

    pub fn contains_local(&self, point: Vec2) -> bool {
        let n = self.polygon.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.polygon[i];
            let b = self.polygon[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Intersects the ray with the surface, constrained to the tracked
    /// boundary polygon. Hits behind the ray origin are rejected.
    pub fn raycast(&self, ray: Ray) -> Option<PlaneHit> {
        let normal = self.normal();
        let denom = normal.dot(ray.dir);
        if denom.abs() <= 1.0e-6 {
            return None;
        }
        let t = (self.pose.position - ray.origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }
        let point = ray.point_at(t);
        let local = self.world_to_local(point);
        if !self.contains_local(Vec2::new(local.x, local.z)) {
            return None;
        }
        Some(PlaneHit {
            plane: self.id,
            pose: Pose::new(point, self.pose.rotation),
            distance: t,
        })
    }
}

/// Where a ray met a tracked surface, oriented like the surface itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub plane: PlaneId,
    pub pose: Pose,
    pub distance: f32,
}
