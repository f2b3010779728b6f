use argh::FromArgs;
use std::path::PathBuf;

use splatprep::{
    export::{ExportConfig, Exporter, Scene},
    k3d::{
        camera::{CameraModel, Resolution},
        io::obj::read_obj,
        mesh::{MeshObject, TriangleMesh},
        pointcloud::PointColor,
        transforms::{Transform, TransformDesc},
    },
};

#[derive(FromArgs)]
/// Place cameras around a mesh, render them and write a COLMAP text model
struct Args {
    /// path to a Wavefront OBJ mesh, a 2 units cube when omitted
    #[argh(option)]
    mesh: Option<PathBuf>,

    /// path to a JSON export config
    #[argh(option)]
    config: Option<PathBuf>,

    /// output directory
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// number of cameras, 1 to 100
    #[argh(option)]
    num_cameras: Option<usize>,

    /// number of surface points, 1 to 10000
    #[argh(option)]
    num_points: Option<usize>,

    /// field of view in degrees
    #[argh(option)]
    fov: Option<f64>,

    /// multiplier applied to the framing distance
    #[argh(option)]
    margin: Option<f64>,

    /// render width in pixels
    #[argh(option)]
    width: Option<u32>,

    /// render height in pixels
    #[argh(option)]
    height: Option<u32>,

    /// camera model, PINHOLE or OPENCV
    #[argh(option)]
    model: Option<CameraModel>,

    /// give every point a random color instead of white
    #[argh(switch)]
    random_colors: bool,

    /// seed of the point sampler and of random colors
    #[argh(option)]
    seed: Option<u64>,

    /// only write the tables, skip rendering
    #[argh(switch)]
    no_render: bool,

    /// mesh location as x,y,z
    #[argh(option, from_str_fn(parse_vec3))]
    location: Option<[f64; 3]>,

    /// mesh rotation as XYZ Euler angles in degrees, x,y,z
    #[argh(option, from_str_fn(parse_vec3))]
    rotation: Option<[f64; 3]>,

    /// mesh scale as x,y,z
    #[argh(option, from_str_fn(parse_vec3))]
    scale: Option<[f64; 3]>,
}

fn parse_vec3(value: &str) -> Result<[f64; 3], String> {
    let values = value
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{}: {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|_| format!("expected three comma separated values, got {}", value))
}

impl Args {
    fn export_config(&self) -> Result<ExportConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_json_file(path)?,
            None => ExportConfig::default(),
        };

        if let Some(output) = &self.output {
            config.output_directory = output.clone();
        }
        if let Some(num_cameras) = self.num_cameras {
            config.num_cameras = num_cameras;
        }
        if let Some(num_points) = self.num_points {
            config.num_points = num_points;
        }
        if let Some(fov) = self.fov {
            config.fov_degrees = fov;
        }
        if let Some(margin) = self.margin {
            config.safety_margin = margin;
        }
        if self.width.is_some() || self.height.is_some() {
            let base = config.resolution.unwrap_or_default();
            config.resolution = Some(Resolution::new(
                self.width.unwrap_or(base.width),
                self.height.unwrap_or(base.height),
            ));
        }
        if let Some(model) = self.model {
            config.camera_model = model;
        }
        if self.random_colors {
            config.point_color = PointColor::Random;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_render {
            config.render_images = false;
        }

        Ok(config)
    }

    fn transform(&self) -> Transform {
        let default = TransformDesc::default();
        TransformDesc {
            location: self.location.unwrap_or(default.location),
            rotation_euler_deg: self.rotation.unwrap_or(default.rotation_euler_deg),
            scale: self.scale.unwrap_or(default.scale),
        }
        .into()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let mut config = args.export_config()?;

    let (name, mesh) = match &args.mesh {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Mesh".to_string());
            (name, read_obj(path)?)
        }
        None => ("Cube".to_string(), TriangleMesh::cube(2.0)),
    };
    log::info!(
        "loaded {} with {} vertices and {} faces",
        name,
        mesh.num_vertices(),
        mesh.num_faces()
    );

    let mut scene = Scene::new();
    scene.add(MeshObject::new(name.clone(), mesh, args.transform()))?;
    config.target = Some(name);

    let report = Exporter::new(config).run(&mut scene)?;

    for path in report.table_paths.iter().chain(&report.image_paths) {
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
