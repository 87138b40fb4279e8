//! CPU-side geometry: loading, procedural primitives and clean-up.
//!
//! Geometry lives in a [`RawGeometry`] until it is uploaded as a [`Mesh`].
//! Models are loaded through a small fluent builder:
//!
//! ```no_run
//! use gimbal::PendingGeometry;
//!
//! let model = PendingGeometry::from_file("resources/models/box/wooden_box.obj")
//!     .centered()
//!     .normalized()
//!     .load()?;
//! println!("{} triangles", model.geometry.triangle_count());
//! # Ok::<(), gimbal::Error>(())
//! ```
//!
//! # Supported Formats
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | OBJ    | `.obj`     | Triangulated on load; first material's diffuse map is reported |
//! | STL    | `.stl`     | Binary and ASCII, no UV coordinates |
//!
//! [`Mesh`]: crate::mesh::Mesh

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::{Error, Result};
use crate::mesh::Vertex3d;

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Wraps a vertex list and a triangle index list.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    ///
    /// Empty geometry yields a zero-sized box at the origin.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Extent of the bounding box along each axis.
    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).into();
        }
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) * factor).into();
        }
    }

    /// Moves the bounding box center to the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        self.translate(-center);
    }

    /// Scales the geometry so its largest dimension is 1.
    pub fn normalize(&mut self) {
        let size = self.size();
        let max_dim = size.x.max(size.y).max(size.z);
        if max_dim > 0.0 {
            self.scale(1.0 / max_dim);
        }
    }

    /// Recomputes smooth vertex normals by summing area-weighted face normals.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0; 3];
        }

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for i in [i0, i1, i2] {
                let n = Vec3::from(self.vertices[i].normal) + face_normal;
                self.vertices[i].normal = n.into();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Unique undirected edges of the triangle list, as a line-list index buffer.
    ///
    /// Edges are emitted in first-seen order with the smaller index first.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let edge = (a.min(b), a.max(b));
                if edge.0 != edge.1 && seen.insert(edge) {
                    lines.extend_from_slice(&[edge.0, edge.1]);
                }
            }
        }

        lines
    }

    /// A square grid on the XZ plane as line-list geometry.
    ///
    /// `slices` cells per side, each `spacing` wide, centered on the origin.
    /// The returned indices are line pairs, not triangles.
    pub fn grid(slices: u32, spacing: f32) -> Self {
        let half = (slices / 2) as i32;
        let extent = half as f32 * spacing;
        let up = [0.0, 1.0, 0.0];

        let mut vertices = Vec::new();
        for i in -half..=half {
            let offset = i as f32 * spacing;
            // Line parallel to Z, then line parallel to X.
            vertices.push(Vertex3d::new([offset, 0.0, -extent], up, [0.0, 0.0]));
            vertices.push(Vertex3d::new([offset, 0.0, extent], up, [0.0, 1.0]));
            vertices.push(Vertex3d::new([-extent, 0.0, offset], up, [0.0, 0.0]));
            vertices.push(Vertex3d::new([extent, 0.0, offset], up, [1.0, 0.0]));
        }

        let indices = (0..vertices.len() as u32).collect();
        Self { vertices, indices }
    }

    /// A unit cube centered at the origin, four vertices per face.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // Front face (Z+)
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
            // Back face (Z-)
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
            // Top face (Y+)
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
            // Bottom face (Y-)
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
            // Right face (X+)
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
            // Left face (X-)
            Vertex3d::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
        ];

        #[rustfmt::skip]
        let indices = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        Self { vertices, indices }
    }

    /// A UV sphere of the given radius centered at the origin.
    pub fn sphere(segments: u32, rings: u32, radius: f32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let (ring_radius, y) = phi.sin_cos();

            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                let uv = [seg as f32 / segments as f32, ring as f32 / rings as f32];
                vertices.push(Vertex3d::new((normal * radius).into(), normal.into(), uv));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;
                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Self { vertices, indices }
    }
}

/// Geometry loaded from disk, with the diffuse texture it references.
#[derive(Clone, Debug)]
pub struct Model {
    pub geometry: RawGeometry,
    /// Diffuse map from the model's material, resolved against the model's directory.
    pub diffuse_texture: Option<PathBuf>,
}

/// Builder that loads a model file and cleans it up before upload.
///
/// Transformations run in a fixed order: center, normalize, smooth normals.
#[derive(Clone, Debug)]
pub struct PendingGeometry {
    path: PathBuf,
    center: bool,
    normalize: bool,
    smooth_normals: bool,
}

impl PendingGeometry {
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            center: false,
            normalize: false,
            smooth_normals: false,
        }
    }

    /// Centers the geometry at the origin.
    pub fn centered(mut self) -> Self {
        self.center = true;
        self
    }

    /// Scales the geometry to fit within a unit cube.
    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Recalculates smooth vertex normals.
    pub fn smooth_normals(mut self) -> Self {
        self.smooth_normals = true;
        self
    }

    pub fn load(self) -> Result<Model> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        let mut model = match ext.as_str() {
            "obj" => load_obj(&self.path)?,
            "stl" => Model {
                geometry: load_stl(&self.path)?,
                diffuse_texture: None,
            },
            _ => return Err(Error::UnknownFormat(ext)),
        };

        if model.geometry.indices.is_empty() {
            return Err(Error::EmptyModel(self.path));
        }

        if self.center {
            model.geometry.recenter();
        }
        if self.normalize {
            model.geometry.normalize();
        }
        if self.smooth_normals {
            model.geometry.recalculate_normals();
        }

        log::info!(
            "loaded {} ({} vertices, {} triangles)",
            self.path.display(),
            model.geometry.vertices.len(),
            model.geometry.triangle_count()
        );
        Ok(model)
    }
}

fn load_obj(path: &Path) -> Result<Model> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|source| Error::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("no materials for {}: {}", path.display(), e);
        Vec::new()
    });

    let mut geometry = RawGeometry::default();
    let mut missing_normals = false;
    let mut material_id = None;

    for model in &models {
        let mesh = &model.mesh;
        let base = geometry.vertices.len() as u32;
        let count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == count;
        missing_normals |= !has_normals;
        material_id = material_id.or(mesh.material_id);

        for i in 0..count {
            let position = [mesh.positions[3 * i], mesh.positions[3 * i + 1], mesh.positions[3 * i + 2]];
            let normal = if has_normals {
                [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
            } else {
                [0.0; 3]
            };
            // OBJ puts v = 0 at the bottom of the image; textures are sampled top-down.
            let uv = if has_uvs {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            };
            geometry.vertices.push(Vertex3d::new(position, normal, uv));
        }

        geometry.indices.extend(mesh.indices.iter().map(|&i| base + i));
    }

    if missing_normals {
        log::debug!("{} lacks normals, computing them", path.display());
        geometry.recalculate_normals();
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let diffuse_texture = material_id
        .and_then(|id| materials.get(id))
        .and_then(|m| m.diffuse_texture.as_ref())
        .map(|name| base_dir.join(name));

    Ok(Model {
        geometry,
        diffuse_texture,
    })
}

fn load_stl(path: &Path) -> Result<RawGeometry> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    parse_stl(&mut reader)
}

fn parse_stl<R: std::io::Read + std::io::Seek>(reader: &mut R) -> Result<RawGeometry> {
    let stl = stl_io::read_stl(reader).map_err(|e| Error::Stl(e.to_string()))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    // Faces are flat shaded, so every face gets its own three vertices.
    for face in &stl.faces {
        let normal: [f32; 3] = face.normal.into();
        let base = vertices.len() as u32;
        for &vertex_idx in &face.vertices {
            let position: [f32; 3] = stl.vertices[vertex_idx].into();
            vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    Ok(RawGeometry::new(vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(p: [f32; 3]) -> Vertex3d {
        Vertex3d::new(p, [0.0, 1.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn raw_geometry_bounds() {
        let geom = RawGeometry::new(
            vec![vertex([0.0, 0.0, 0.0]), vertex([1.0, 2.0, 3.0]), vertex([-1.0, -1.0, -1.0])],
            vec![0, 1, 2],
        );

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(RawGeometry::default().bounds(), (Vec3::ZERO, Vec3::ZERO));
    }

    #[test]
    fn raw_geometry_recenter_and_normalize() {
        let mut geom = RawGeometry::new(vec![vertex([2.0, 2.0, 2.0]), vertex([6.0, 4.0, 3.0])], vec![0, 1, 0]);

        geom.recenter();
        assert!(geom.center().length() < 0.001);

        geom.normalize();
        let size = geom.size();
        assert!((size.x - 1.0).abs() < 0.001);
        assert!((size.y - 0.5).abs() < 0.001);
    }

    #[test]
    fn cube_edges_are_unique() {
        let cube = RawGeometry::cube();
        assert_eq!(cube.triangle_count(), 12);

        let edges = cube.edges();
        // Per face: four sides plus one diagonal; faces share no vertices.
        assert_eq!(edges.len(), 6 * 5 * 2);

        let mut pairs: Vec<_> = edges.chunks_exact(2).map(|e| (e[0], e[1])).collect();
        assert!(pairs.iter().all(|(a, b)| a < b));
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), 30);
    }

    #[test]
    fn shared_edge_is_emitted_once() {
        let quad = RawGeometry::new(
            vec![vertex([0.0; 3]), vertex([1.0, 0.0, 0.0]), vertex([1.0, 1.0, 0.0]), vertex([0.0, 1.0, 0.0])],
            vec![0, 1, 2, 2, 3, 0],
        );
        assert_eq!(quad.edges(), vec![0, 1, 1, 2, 0, 2, 2, 3, 0, 3]);
    }

    #[test]
    fn grid_line_count_and_extent() {
        let grid = RawGeometry::grid(10, 1.0);
        // 11 lines along each axis, two vertices each.
        assert_eq!(grid.vertices.len(), 44);
        assert_eq!(grid.indices.len(), 44);

        let (min, max) = grid.bounds();
        assert_eq!(min, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(max, Vec3::new(5.0, 0.0, 5.0));
    }

    #[test]
    fn sphere_has_requested_radius() {
        let sphere = RawGeometry::sphere(8, 8, 0.2);
        assert_eq!(sphere.triangle_count(), 8 * 8 * 2);
        for v in &sphere.vertices {
            assert!((Vec3::from(v.position).length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn recalculated_normals_are_unit() {
        let mut cube = RawGeometry::cube();
        cube.recalculate_normals();
        for v in &cube.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.dot(Vec3::from(v.position)) > 0.0);
        }
    }

    #[test]
    fn smooth_normals_replace_authored_normals() {
        // Every vertex claims +Y; only the top face is really facing up.
        let obj = "v -1 0 1\nv 1 0 1\nv 1 2 1\nv -1 2 1\nvn 0 1 0\nf 1//1 2//1 3//1 4//1\n";
        let path = std::env::temp_dir().join(format!("gimbal_smooth_{}.obj", std::process::id()));
        std::fs::write(&path, obj).unwrap();

        let authored = PendingGeometry::from_file(&path).load().unwrap();
        let smoothed = PendingGeometry::from_file(&path).smooth_normals().load().unwrap();
        std::fs::remove_file(&path).ok();

        assert!(authored.geometry.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        for v in &smoothed.geometry.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = PendingGeometry::from_file("model.fbx").load().unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(ext) if ext == "fbx"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PendingGeometry::from_file("does/not/exist.obj").load();
        assert!(matches!(err, Err(Error::Obj { .. })));
    }

    #[test]
    fn parses_ascii_stl() {
        let stl = b"solid t
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
endsolid t
";
        let geom = parse_stl(&mut std::io::Cursor::new(&stl[..])).unwrap();
        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.indices, vec![0, 1, 2]);
        assert_eq!(geom.vertices[0].normal, [0.0, 0.0, 1.0]);
    }
}
