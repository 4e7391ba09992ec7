use crate::core::color::seeded_tint;
use crate::core::geometry::Vertex;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::texture::Texture;
use log::{debug, info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// A preloaded material library: the converted materials plus the raw tobj
/// entries the geometry stage resolves `mtllib`/`usemtl` references against.
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
    raw: Vec<tobj::Material>,
}

impl MaterialLibrary {
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Stage 1: loads and preloads a material library (.mtl).
///
/// Preloading resolves every referenced diffuse texture through the image
/// crate, relative to the library's directory. A texture that cannot be read
/// is replaced by a 1x1 neutral stand-in so the geometry stage can proceed.
pub fn load_material_library(mtl_path: &Path) -> Result<MaterialLibrary, String> {
    info!("Loading material library: {}", mtl_path.display());

    let (raw, _name_map) = tobj::load_mtl(mtl_path)
        .map_err(|e| format!("Failed to load MTL '{}': {}", mtl_path.display(), e))?;

    let base_dir = mtl_path.parent().unwrap_or_else(|| Path::new("."));

    let materials = raw
        .iter()
        .map(|mat| {
            let texture = mat.diffuse_texture.as_ref().map(|tex_name| {
                let tex_path = base_dir.join(tex_name);
                match Texture::load(&tex_path) {
                    Ok(tex) => Arc::new(tex),
                    Err(e) => {
                        warn!("{e}; using a neutral stand-in");
                        Arc::new(Texture::solid([204, 204, 204]))
                    }
                }
            });

            Material {
                name: mat.name.clone(),
                diffuse_color: Vector3::from(mat.diffuse.unwrap_or([0.8, 0.8, 0.8])),
                specular_color: Vector3::from(mat.specular.unwrap_or([0.5, 0.5, 0.5])),
                shininess: mat.shininess.unwrap_or(32.0),
                diffuse_texture: texture,
            }
        })
        .collect::<Vec<_>>();

    info!("Material library ready: {} material(s)", materials.len());

    Ok(MaterialLibrary { materials, raw })
}

/// Stage 2: loads the geometry (.obj), resolving its material references
/// against the already-loaded library instead of touching the filesystem
/// again.
pub fn load_geometry(obj_path: &Path, library: &MaterialLibrary) -> Result<Model, String> {
    info!("Loading geometry: {}", obj_path.display());

    let file = File::open(obj_path)
        .map_err(|e| format!("Failed to open OBJ '{}': {}", obj_path.display(), e))?;
    let mut reader = BufReader::new(file);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
    };

    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options, |_| {
        let name_map = library
            .raw
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Ok((library.raw.clone(), name_map))
    })
    .map_err(|e| format!("Failed to load OBJ '{}': {}", obj_path.display(), e))?;

    let obj_basename = obj_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let mut materials = library.materials.clone();
    let mut meshes: Vec<Mesh> = Vec::with_capacity(models.len());

    for (mesh_index, model) in models.iter().enumerate() {
        let mesh = &model.mesh;
        let num_vertices = mesh.positions.len() / 3;

        let mesh_name = if model.name.is_empty() || model.name == "unnamed_object" {
            format!("{obj_basename}_{mesh_index}")
        } else {
            model.name.clone()
        };

        if mesh.indices.is_empty() {
            debug!("Skipping mesh '{mesh_name}' without indices");
            continue;
        }

        let has_normals = !mesh.normals.is_empty();
        let has_texcoords = !mesh.texcoords.is_empty();

        let generated_normals = if !has_normals {
            warn!("Mesh '{mesh_name}' has no normals; generating smooth vertex normals");
            let positions: Vec<Point3<f32>> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0], p[1], p[2]))
                .collect();
            Some(smooth_vertex_normals(&positions, &mesh.indices))
        } else {
            None
        };

        if !has_texcoords && !library.is_empty() {
            debug!("Mesh '{mesh_name}' has no texture coordinates; textures will not map");
        }

        let mut vertices = Vec::with_capacity(num_vertices);
        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );

            let normal = if let Some(ref generated) = generated_normals {
                generated[i]
            } else {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            };

            let texcoord = if has_texcoords {
                Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vector2::zeros()
            };

            vertices.push(Vertex::new(position, normal, texcoord));
        }

        let material_id = match mesh.material_id {
            Some(id) if id < materials.len() => id,
            Some(id) => {
                warn!("Mesh '{mesh_name}' has invalid material id {id}; using a generated tint");
                push_tint_material(&mut materials, &mesh_name, mesh_index)
            }
            None => {
                if materials.is_empty() {
                    push_tint_material(&mut materials, &mesh_name, mesh_index)
                } else {
                    0
                }
            }
        };

        debug!(
            "Mesh '{}': {} vertices, {} triangles, material {}",
            mesh_name,
            vertices.len(),
            mesh.indices.len() / 3,
            material_id
        );

        meshes.push(Mesh::new(
            mesh_name,
            vertices,
            mesh.indices.clone(),
            material_id,
        ));
    }

    if meshes.is_empty() {
        return Err(format!(
            "OBJ '{}' contains no usable meshes",
            obj_path.display()
        ));
    }

    let model = Model::new(obj_basename, meshes, materials);
    info!(
        "Geometry ready: '{}' ({} meshes, {} vertices, {} triangles)",
        model.name,
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );

    Ok(model)
}

fn push_tint_material(materials: &mut Vec<Material>, mesh_name: &str, seed: usize) -> usize {
    materials.push(Material::untextured(
        format!("{mesh_name}_tint"),
        seeded_tint(seed as u64),
    ));
    materials.len() - 1
}

/// Generates smooth per-vertex normals by averaging the (area-weighted) face
/// normals of every triangle touching each vertex.
fn smooth_vertex_normals(positions: &[Point3<f32>], indices: &[u32]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];

    for face in indices.chunks_exact(3) {
        let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            warn!("Face with out-of-range vertex index; skipping");
            continue;
        }

        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let face_normal = edge1.cross(&edge2);

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    let mut zero_count = 0;
    for normal in normals.iter_mut() {
        if normal.norm_squared() > 1e-12 {
            normal.normalize_mut();
        } else {
            *normal = Vector3::y();
            zero_count += 1;
        }
    }
    if zero_count > 0 {
        warn!("{zero_count} vertices had degenerate normals; defaulted to [0, 1, 0]");
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MTL_SOURCE: &str = "\
newmtl stone
Kd 0.6 0.5 0.4
Ks 0.2 0.2 0.2
Ns 16.0

newmtl grass
Kd 0.1 0.8 0.2
";

    const OBJ_SOURCE: &str = "\
mtllib pair.mtl
o slab
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
usemtl grass
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    fn write_pair(dir: &Path) -> (PathBuf, PathBuf) {
        let mtl = dir.join("pair.mtl");
        let obj = dir.join("pair.obj");
        fs::write(&mtl, MTL_SOURCE).unwrap();
        fs::write(&obj, OBJ_SOURCE).unwrap();
        (mtl, obj)
    }

    #[test]
    fn material_library_loads_and_converts() {
        let dir = TempDir::new().unwrap();
        let (mtl, _) = write_pair(dir.path());

        let library = load_material_library(&mtl).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.materials[0].name, "stone");
        assert_approx_eq!(f32, library.materials[0].diffuse_color.x, 0.6, epsilon = 1e-5);
        assert_approx_eq!(f32, library.materials[0].shininess, 16.0, epsilon = 1e-5);
        assert!(library.materials[0].diffuse_texture.is_none());
    }

    #[test]
    fn missing_material_library_is_an_error() {
        let result = load_material_library(Path::new("/nonexistent/missing.mtl"));
        assert!(result.is_err());
    }

    #[test]
    fn geometry_resolves_materials_by_name() {
        let dir = TempDir::new().unwrap();
        let (mtl, obj) = write_pair(dir.path());

        let library = load_material_library(&mtl).unwrap();
        let model = load_geometry(&obj, &library).unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        // The slab uses "grass", the second entry of the library.
        let mesh = &model.meshes[0];
        assert_eq!(model.materials[mesh.material_id].name, "grass");
        assert_approx_eq!(
            f32,
            model.materials[mesh.material_id].diffuse_color.y,
            0.8,
            epsilon = 1e-5
        );
    }

    #[test]
    fn missing_geometry_is_an_error() {
        let library = MaterialLibrary {
            materials: vec![],
            raw: vec![],
        };
        let result = load_geometry(Path::new("/nonexistent/missing.obj"), &library);
        assert!(result.is_err());
    }

    #[test]
    fn mesh_without_material_gets_tint() {
        let dir = TempDir::new().unwrap();
        let obj = dir.path().join("plain.obj");
        fs::write(
            &obj,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
        )
        .unwrap();

        let library = MaterialLibrary {
            materials: vec![],
            raw: vec![],
        };
        let model = load_geometry(&obj, &library).unwrap();
        assert_eq!(model.materials.len(), 1);
        assert!(model.materials[0].name.ends_with("_tint"));
    }

    #[test]
    fn smooth_normals_for_flat_square_point_up() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let indices = vec![0, 2, 1, 0, 3, 2];
        let normals = smooth_vertex_normals(&positions, &indices);
        for n in &normals {
            assert_approx_eq!(f32, n.y, 1.0, epsilon = 1e-5);
        }
    }
}
