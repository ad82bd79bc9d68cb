use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use arstage_scene::Aabb;

/// Edge-list mesh for painter rendering. Builtins sit with their base at the
/// local origin so placements rest on the tapped surface.
pub(crate) struct WireMesh {
    pub positions: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
    pub bounds: Aabb,
}

impl WireMesh {
    fn new(positions: Vec<Vec3>, edges: Vec<[u32; 2]>) -> Self {
        let bounds = Aabb::from_points(positions.iter().copied()).unwrap_or(Aabb {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        });
        Self {
            positions,
            edges,
            bounds,
        }
    }
}

pub(crate) fn wire_box(size: Vec3) -> WireMesh {
    let hx = size.x * 0.5;
    let hz = size.z * 0.5;
    let h = size.y;

    let positions = vec![
        Vec3::new(-hx, 0.0, -hz),
        Vec3::new(hx, 0.0, -hz),
        Vec3::new(hx, 0.0, hz),
        Vec3::new(-hx, 0.0, hz),
        Vec3::new(-hx, h, -hz),
        Vec3::new(hx, h, -hz),
        Vec3::new(hx, h, hz),
        Vec3::new(-hx, h, hz),
    ];
    let edges = vec![
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [4, 5],
        [5, 6],
        [6, 7],
        [7, 4],
        [0, 4],
        [1, 5],
        [2, 6],
        [3, 7],
    ];
    WireMesh::new(positions, edges)
}

pub(crate) fn wire_sphere(radius: f32, rows: u32, cols: u32) -> WireMesh {
    let rows = rows.max(3);
    let cols = cols.max(3);
    let mut positions = Vec::new();

    for r in 0..=rows {
        let theta = std::f32::consts::PI * r as f32 / rows as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        for c in 0..=cols {
            let phi = std::f32::consts::TAU * c as f32 / cols as f32;
            positions.push(Vec3::new(
                radius * sin_theta * phi.cos(),
                radius + radius * cos_theta,
                radius * sin_theta * phi.sin(),
            ));
        }
    }

    let stride = cols + 1;
    let mut edges = Vec::new();
    // Rings, skipping the degenerate pole rows.
    for r in 1..rows {
        for c in 0..cols {
            let i0 = r * stride + c;
            edges.push([i0, i0 + 1]);
        }
    }
    // Meridians.
    for r in 0..rows {
        for c in 0..cols {
            let i0 = r * stride + c;
            edges.push([i0, i0 + stride]);
        }
    }
    WireMesh::new(positions, edges)
}

pub(crate) fn wire_tube(radius: f32, height: f32, segments: u32) -> WireMesh {
    let segments = segments.max(3);
    let mut positions = Vec::new();
    for ring in 0..2 {
        let y = ring as f32 * height;
        for s in 0..segments {
            let phi = std::f32::consts::TAU * s as f32 / segments as f32;
            positions.push(Vec3::new(radius * phi.cos(), y, radius * phi.sin()));
        }
    }
    let mut edges = Vec::new();
    for ring in 0..2u32 {
        let base = ring * segments;
        for s in 0..segments {
            edges.push([base + s, base + (s + 1) % segments]);
        }
    }
    for s in 0..segments {
        edges.push([s, s + segments]);
    }
    WireMesh::new(positions, edges)
}

#[cfg(not(target_arch = "wasm32"))]
fn obj_wireframe(path: &str) -> Result<WireMesh, String> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _) =
        tobj::load_obj(path, &options).map_err(|err| format!("OBJ load failed: {err}"))?;
    if models.is_empty() {
        return Err("OBJ has no geometry".to_string());
    }

    let mut positions: Vec<Vec3> = Vec::new();
    let mut edge_set: BTreeSet<(u32, u32)> = BTreeSet::new();
    let mut vertex_offset = 0u32;

    for model in models {
        let mesh = &model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err("OBJ has malformed positions".to_string());
        }
        let vertex_count = (mesh.positions.len() / 3) as u32;
        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|v| Vec3::new(v[0], v[1], v[2])),
        );
        for tri in mesh.indices.chunks_exact(3) {
            let a = tri[0] + vertex_offset;
            let b = tri[1] + vertex_offset;
            let c = tri[2] + vertex_offset;
            for (lo, hi) in [(a, b), (b, c), (c, a)] {
                edge_set.insert((lo.min(hi), lo.max(hi)));
            }
        }
        vertex_offset += vertex_count;
    }

    let edges = edge_set.into_iter().map(|(a, b)| [a, b]).collect();
    Ok(WireMesh::new(positions, edges))
}

/// Resolves opaque renderable handles to wire meshes, loading each handle at
/// most once.
pub(crate) struct MeshLibrary {
    cache: HashMap<String, WireMesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, handle: &str) -> &WireMesh {
        self.cache
            .entry(handle.to_string())
            .or_insert_with(|| build_mesh(handle))
    }

    pub fn get(&self, handle: &str) -> Option<&WireMesh> {
        self.cache.get(handle)
    }
}

fn build_mesh(handle: &str) -> WireMesh {
    match handle {
        "builtin:box" => wire_box(Vec3::new(0.4, 0.4, 0.4)),
        "builtin:sphere" => wire_sphere(0.22, 8, 12),
        "builtin:tube" => wire_tube(0.15, 0.7, 12),
        other => {
            #[cfg(not(target_arch = "wasm32"))]
            if other.ends_with(".obj") {
                match obj_wireframe(other) {
                    Ok(mesh) => return mesh,
                    Err(err) => {
                        tracing::warn!(handle = other, error = %err, "falling back to box stand-in");
                        return wire_box(Vec3::splat(0.4));
                    }
                }
            }
            tracing::warn!(handle = other, "unknown renderable handle, using box stand-in");
            wire_box(Vec3::splat(0.4))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_expected_counts() {
        let mesh = wire_box(Vec3::new(0.4, 0.5, 0.4));
        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.edges.len(), 12);
        assert_eq!(mesh.bounds.min.y, 0.0);
        assert!((mesh.bounds.max.y - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn sphere_has_expected_counts() {
        let rows = 4;
        let cols = 8;
        let mesh = wire_sphere(0.2, rows, cols);
        assert_eq!(mesh.positions.len(), ((rows + 1) * (cols + 1)) as usize);
        assert_eq!(mesh.edges.len(), ((rows - 1) * cols + rows * cols) as usize);
        // Base at the origin, top at the diameter.
        assert!(mesh.bounds.min.y.abs() < 1.0e-5);
        assert!((mesh.bounds.max.y - 0.4).abs() < 1.0e-5);
    }

    #[test]
    fn tube_has_expected_counts() {
        let mesh = wire_tube(0.1, 0.6, 10);
        assert_eq!(mesh.positions.len(), 20);
        assert_eq!(mesh.edges.len(), 30);
    }

    #[test]
    fn library_caches_and_falls_back() {
        let mut library = MeshLibrary::new();
        let first = library.resolve("builtin:box") as *const WireMesh;
        let second = library.resolve("builtin:box") as *const WireMesh;
        assert_eq!(first, second);

        let fallback = library.resolve("no-such-handle");
        assert_eq!(fallback.positions.len(), 8);
        assert!(library.get("no-such-handle").is_some());
        assert!(library.get("never-resolved").is_none());
    }
}
