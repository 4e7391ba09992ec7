use crate::io::config::AssetConfig;
use crate::io::obj_loader::{load_geometry, load_material_library};
use crate::scene::model::Model;
use crate::scene::utils::center_model;
use log::{debug, error, info};
use nalgebra::Point3;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

/// A fully loaded and recentered model, plus where it used to sit.
pub struct LoadedAsset {
    pub model: Model,
    /// Bounding-box center before recentering, in the asset's coordinates.
    pub original_center: Point3<f32>,
    /// Bounding radius, usable to frame the camera.
    pub radius: f32,
}

/// Checks that the asset pair exists before any loading starts.
pub fn validate_asset(asset: &AssetConfig) -> Result<(), String> {
    let mtl = asset.mtl_path();
    if !mtl.exists() {
        return Err(format!("Material library not found: {}", mtl.display()));
    }
    let obj = asset.obj_path();
    if !obj.exists() {
        return Err(format!("Geometry file not found: {}", obj.display()));
    }
    Ok(())
}

/// Loads the asset pair synchronously: the material library first, then the
/// geometry referencing it, then recenters the result at the origin.
///
/// A failure in the material stage aborts before the geometry stage begins;
/// neither stage is retried.
pub fn load_asset(asset: &AssetConfig) -> Result<LoadedAsset, String> {
    let start = Instant::now();

    let library = load_material_library(&asset.mtl_path())?;
    let mut model = load_geometry(&asset.obj_path(), &library)?;

    let (original_center, radius) = center_model(&mut model)
        .ok_or_else(|| format!("Model '{}' has no vertices to center", model.name))?;

    debug!(
        "Recentered '{}': original center {:.3?}, bounding radius {:.3}",
        model.name, original_center, radius
    );
    info!("Asset '{}' loaded in {:.2?}", model.name, start.elapsed());

    Ok(LoadedAsset {
        model,
        original_center,
        radius,
    })
}

/// Spawns the load on a background thread; the result arrives on the
/// returned channel. The frame loop keeps running while the load is in
/// flight and simply proceeds without the asset if it fails.
pub fn spawn_load(asset: &AssetConfig) -> mpsc::Receiver<Result<LoadedAsset, String>> {
    let (sender, receiver) = mpsc::channel();
    let asset = asset.clone();

    thread::spawn(move || {
        let result = validate_asset(&asset).and_then(|_| load_asset(&asset));
        if let Err(e) = &result {
            error!("Asset load failed: {e}");
        }
        // The receiver may already be gone if the viewer shut down.
        let _ = sender.send(result);
    });

    receiver
}

/// Renders a one-line description of the pair being loaded, for status text.
pub fn describe_asset(asset: &AssetConfig) -> String {
    format!(
        "{} + {}",
        asset.mtl_path().display(),
        asset.obj_path().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_asset(dir: &Path, name: &str) -> AssetConfig {
        fs::write(
            dir.join(format!("{name}.mtl")),
            "newmtl paint\nKd 0.9 0.1 0.1\n",
        )
        .unwrap();
        fs::write(
            dir.join(format!("{name}.obj")),
            format!(
                "mtllib {name}.mtl\nv 10 10 10\nv 12 10 10\nv 12 12 10\nvn 0 0 1\nusemtl paint\nf 1//1 2//1 3//1\n"
            ),
        )
        .unwrap();
        AssetConfig {
            dir: dir.to_string_lossy().into_owned(),
            name: name.to_string(),
        }
    }

    #[test]
    fn load_asset_centers_model() {
        let dir = TempDir::new().unwrap();
        let asset = write_asset(dir.path(), "tri");

        let loaded = load_asset(&asset).unwrap();
        assert_approx_eq!(f32, loaded.original_center.x, 11.0, epsilon = 1e-4);
        assert_approx_eq!(f32, loaded.original_center.y, 11.0, epsilon = 1e-4);
        assert!(loaded.radius > 0.0);

        // All vertices now straddle the origin.
        let bbox = crate::scene::utils::Aabb::from_model(&loaded.model).unwrap();
        assert_approx_eq!(f32, bbox.center().coords.norm(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn missing_material_library_stops_before_geometry() {
        let dir = TempDir::new().unwrap();
        // Geometry exists, the library does not.
        fs::write(
            dir.path().join("lone.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        let asset = AssetConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            name: "lone".to_string(),
        };

        let err = validate_asset(&asset).unwrap_err();
        assert!(err.contains("Material library not found"));
    }

    #[test]
    fn spawn_load_delivers_on_channel() {
        let dir = TempDir::new().unwrap();
        let asset = write_asset(dir.path(), "bg");

        let receiver = spawn_load(&asset);
        let result = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("loader thread did not report");
        assert!(result.is_ok());
    }

    #[test]
    fn spawn_load_reports_failure() {
        let asset = AssetConfig {
            dir: "/nonexistent".to_string(),
            name: "nothing".to_string(),
        };
        let receiver = spawn_load(&asset);
        let result = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("loader thread did not report");
        assert!(result.is_err());
    }
}
