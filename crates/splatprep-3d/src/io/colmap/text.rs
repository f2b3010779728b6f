use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use super::{CameraModelId, ColmapCamera, ColmapImage, ColmapPoint3d};

/// File name of the camera table.
pub const CAMERAS_TXT: &str = "cameras.txt";

/// File name of the image table.
pub const IMAGES_TXT: &str = "images.txt";

/// File name of the 3D point table.
pub const POINTS3D_TXT: &str = "points3D.txt";

/// Error types for the COLMAP module.
#[derive(Debug, thiserror::Error)]
pub enum ColmapError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Error moving a staged file into place
    #[error("error moving staged file into place")]
    PersistError(#[from] tempfile::PersistError),

    /// Invalid number of camera parameters
    #[error("Invalid number of camera parameters")]
    InvalidNumCameraParams(usize),

    /// Camera model that cannot be written
    #[error("Invalid camera model {0}")]
    InvalidCameraModel(String),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),
}

/// Read the cameras.txt file and return a vector of ColmapCamera structs.
///
/// # Arguments
///
/// * `path` - The path to the cameras.txt file.
///
/// # Returns
///
/// A vector of ColmapCamera structs.
pub fn read_cameras_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapCamera>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);

    // skip the comment lines and parse the rest
    data_lines(reader)?
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_camera_line(line))
        .collect()
}

/// Read the points3D.txt file and return a vector of ColmapPoint3d structs.
///
/// # Arguments
///
/// * `path` - The path to the points3D.txt file.
///
/// # Returns
///
/// A vector of ColmapPoint3d structs.
pub fn read_points3d_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);

    data_lines(reader)?
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_point3d_line(line))
        .collect()
}

/// Read the images.txt file and return a vector of ColmapImage structs.
///
/// # Arguments
///
/// * `path` - The path to the images.txt file.
///
/// # Returns
///
/// A vector of ColmapImage structs.
pub fn read_images_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapImage>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);

    // every image spans two lines, the second one may be empty
    data_lines(reader)?
        .chunks(2)
        .map(|chunk| match chunk {
            [line1, line2] => parse_image_line(line1, line2),
            _ => Err(ColmapError::ParseError(
                "Invalid number of lines".to_string(),
            )),
        })
        .collect()
}

/// Write the cameras table.
///
/// # Arguments
///
/// * `writer` - The destination.
/// * `cameras` - The cameras, one row each.
pub fn write_cameras(writer: &mut impl Write, cameras: &[ColmapCamera]) -> Result<(), ColmapError> {
    writeln!(writer, "# Camera list with one line of data per camera:")?;
    writeln!(writer, "#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]")?;
    writeln!(writer, "# Number of cameras: {}", cameras.len())?;

    for camera in cameras {
        match camera.model_id.num_params() {
            Some(n) if n == camera.params.len() => {}
            Some(_) => return Err(ColmapError::InvalidNumCameraParams(camera.params.len())),
            None => {
                return Err(ColmapError::InvalidCameraModel(
                    camera.model_id.name().to_string(),
                ))
            }
        }

        write!(
            writer,
            "{} {} {} {}",
            camera.camera_id,
            camera.model_id.name(),
            camera.width,
            camera.height
        )?;
        for param in &camera.params {
            write!(writer, " {:?}", param)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write the images table.
///
/// Each image takes two lines: the pose row and the 2D point row, which is empty
/// when the image has no observations.
pub fn write_images(writer: &mut impl Write, images: &[ColmapImage]) -> Result<(), ColmapError> {
    writeln!(writer, "# Image list with two lines of data per image:")?;
    writeln!(
        writer,
        "# IMAGE_ID, QVEC (w, x, y, z), TVEC (x, y, z), CAMERA_ID, NAME"
    )?;
    writeln!(writer, "# POINTS2D[] as (x, y, POINT3D_ID)")?;

    for image in images {
        let [qw, qx, qy, qz] = image.rotation;
        let [tx, ty, tz] = image.translation;
        writeln!(
            writer,
            "{} {:?} {:?} {:?} {:?} {:?} {:?} {:?} {} {}",
            image.image_id, qw, qx, qy, qz, tx, ty, tz, image.camera_id, image.name
        )?;

        let points2d = image
            .points2d
            .iter()
            .map(|(x, y, id)| format!("{:?} {:?} {}", x, y, id))
            .collect::<Vec<_>>();
        writeln!(writer, "{}", points2d.join(" "))?;
    }

    Ok(())
}

/// Write the 3D points table.
pub fn write_points3d(
    writer: &mut impl Write,
    points: &[ColmapPoint3d],
) -> Result<(), ColmapError> {
    writeln!(writer, "# 3D point list with one line of data per point:")?;
    writeln!(
        writer,
        "# POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)"
    )?;

    for point in points {
        let [x, y, z] = point.xyz;
        let [r, g, b] = point.rgb;
        write!(
            writer,
            "{} {:?} {:?} {:?} {} {} {} {:?}",
            point.point3d_id, x, y, z, r, g, b, point.error
        )?;
        for (image_id, point2d_idx) in &point.track {
            write!(writer, " {} {}", image_id, point2d_idx)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write the cameras.txt file.
pub fn write_cameras_txt(
    path: impl AsRef<Path>,
    cameras: &[ColmapCamera],
) -> Result<(), ColmapError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_cameras(&mut writer, cameras)?;
    writer.flush()?;
    Ok(())
}

/// Write the images.txt file.
pub fn write_images_txt(path: impl AsRef<Path>, images: &[ColmapImage]) -> Result<(), ColmapError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_images(&mut writer, images)?;
    writer.flush()?;
    Ok(())
}

/// Write the points3D.txt file.
pub fn write_points3d_txt(
    path: impl AsRef<Path>,
    points: &[ColmapPoint3d],
) -> Result<(), ColmapError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_points3d(&mut writer, points)?;
    writer.flush()?;
    Ok(())
}

/// Writes the three tables next to each other and moves them into place together.
///
/// Tables are staged in temporary files inside the output directory. Nothing is
/// visible under the final names until [`ColmapTextWriter::commit`] is called, and
/// dropping the writer removes the staged files.
pub struct ColmapTextWriter {
    output_dir: PathBuf,
    staged: Vec<(tempfile::NamedTempFile, PathBuf)>,
}

impl ColmapTextWriter {
    /// Create a writer targeting an existing directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            staged: Vec::new(),
        }
    }

    /// Stage the cameras table.
    pub fn stage_cameras(&mut self, cameras: &[ColmapCamera]) -> Result<(), ColmapError> {
        self.stage(CAMERAS_TXT, |w| write_cameras(w, cameras))
    }

    /// Stage the images table.
    pub fn stage_images(&mut self, images: &[ColmapImage]) -> Result<(), ColmapError> {
        self.stage(IMAGES_TXT, |w| write_images(w, images))
    }

    /// Stage the 3D points table.
    pub fn stage_points3d(&mut self, points: &[ColmapPoint3d]) -> Result<(), ColmapError> {
        self.stage(POINTS3D_TXT, |w| write_points3d(w, points))
    }

    /// Move every staged table to its final name.
    ///
    /// # Returns
    ///
    /// The final paths, in staging order.
    pub fn commit(self) -> Result<Vec<PathBuf>, ColmapError> {
        let mut paths = Vec::with_capacity(self.staged.len());
        for (file, path) in self.staged {
            file.persist(&path)?;
            log::debug!("wrote {}", path.display());
            paths.push(path);
        }
        Ok(paths)
    }

    fn stage<F>(&mut self, file_name: &str, write_fn: F) -> Result<(), ColmapError>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ColmapError>,
    {
        let mut file = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.output_dir)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            write_fn(&mut writer)?;
            writer.flush()?;
        }
        self.staged.push((file, self.output_dir.join(file_name)));
        Ok(())
    }
}

// all lines that are not comments
fn data_lines(reader: impl BufRead) -> Result<Vec<String>, ColmapError> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.starts_with('#') {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Utility functions for parsing COLMAP text files
fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, ColmapError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| ColmapError::ParseError(format!("{}: {}", s, e)))
}

// parse a fixed number of values
fn parse_array<T, const N: usize>(parts: &[&str], what: &str) -> Result<[T; N], ColmapError>
where
    T: std::str::FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    parts
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| ColmapError::ParseError(format!("Invalid number of {}", what)))
}

/// Parse a camera line and return a ColmapCamera struct.
/// NOTE: The number of parameters depends on the camera model.
///       CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[0], PARAMS[1], ...
fn parse_camera_line(line: &str) -> Result<ColmapCamera, ColmapError> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() < 5 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    let model_id = parse_camera_model_id(parts[1])?;
    let params = parts[4..]
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?;

    if model_id.num_params() != Some(params.len()) {
        return Err(ColmapError::InvalidNumCameraParams(params.len()));
    }

    Ok(ColmapCamera {
        camera_id: parse_part(parts[0])?,
        model_id,
        width: parse_part(parts[2])?,
        height: parse_part(parts[3])?,
        params,
    })
}

fn parse_camera_model_id(model_id: &str) -> Result<CameraModelId, ColmapError> {
    match model_id {
        "SIMPLE_PINHOLE" => Ok(CameraModelId::CameraModelSimplePinhole),
        "PINHOLE" => Ok(CameraModelId::CameraModelPinhole),
        "SIMPLE_RADIAL" => Ok(CameraModelId::CameraModelSimplifiedRadial),
        "RADIAL" => Ok(CameraModelId::CameraModelRadial),
        "OPENCV" => Ok(CameraModelId::CameraModelOpenCV),
        "OPENCV_FISHEYE" => Ok(CameraModelId::CameraModelOpenCVFisheye),
        "FULL_OPENCV" => Ok(CameraModelId::CameraModelFullOpenCV),
        "FOV" => Ok(CameraModelId::CameraModelFOV),
        "SIMPLE_RADIAL_FISHEYE" => Ok(CameraModelId::CameraModelSimpleRadialFisheye),
        "RADIAL_FISHEYE" => Ok(CameraModelId::CameraModelRadialFisheye),
        "THIN_PRISM_FISHEYE" => Ok(CameraModelId::CameraModelThinPrismFisheye),
        _ => Err(ColmapError::ParseError(format!(
            "Invalid camera model id: {}",
            model_id
        ))),
    }
}

/// Parse a point3d line and return a ColmapPoint3d struct.
///       POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[0], TRACK[1], ...
fn parse_point3d_line(line: &str) -> Result<ColmapPoint3d, ColmapError> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    // check if the number of parts is correct
    if parts.len() < 8 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    Ok(ColmapPoint3d {
        point3d_id: parse_part(parts[0])?,
        xyz: parse_array(&parts[1..4], "xyz coordinates")?,
        rgb: parse_array(&parts[4..7], "rgb coordinates")?,
        error: parse_part(parts[7])?,
        track: parts[8..]
            .chunks_exact(2)
            .map(|chunk| -> Result<(u32, u32), ColmapError> {
                Ok((parse_part(chunk[0])?, parse_part(chunk[1])?))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Parse an image line and return a ColmapImage struct.
/// #   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
/// #   POINTS2D[] as (X, Y, POINT3D_ID)
fn parse_image_line(line1: &str, line2: &str) -> Result<ColmapImage, ColmapError> {
    // split the line into parts by whitespace
    let parts1 = line1.split_whitespace().collect::<Vec<_>>();
    let parts2 = line2.split_whitespace().collect::<Vec<_>>();

    if parts1.len() != 10 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts1.len()
        )));
    }

    Ok(ColmapImage {
        image_id: parse_part(parts1[0])?,
        rotation: parse_array(&parts1[1..5], "rotation coordinates")?,
        translation: parse_array(&parts1[5..8], "translation coordinates")?,
        camera_id: parse_part(parts1[8])?,
        name: parts1[9].to_string(),
        points2d: parts2
            .chunks_exact(3)
            .map(|chunk| -> Result<(f64, f64, i64), ColmapError> {
                Ok((
                    parse_part(chunk[0])?,
                    parse_part(chunk[1])?,
                    parse_part(chunk[2])?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_camera() -> ColmapCamera {
        ColmapCamera {
            camera_id: 0,
            model_id: CameraModelId::CameraModelPinhole,
            width: 640,
            height: 480,
            params: vec![554.2562584220407, 554.2562584220407, 320.0, 240.0],
        }
    }

    #[test]
    fn test_write_cameras_format() -> Result<(), ColmapError> {
        let mut buf = Vec::new();
        write_cameras(&mut buf, &[sample_camera()])?;
        let text = String::from_utf8(buf).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "# Camera list with one line of data per camera:");
        assert_eq!(lines[1], "#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]");
        assert_eq!(lines[2], "# Number of cameras: 1");
        assert_eq!(
            lines[3],
            "0 PINHOLE 640 480 554.2562584220407 554.2562584220407 320.0 240.0"
        );
        Ok(())
    }

    #[test]
    fn test_write_cameras_rejects_param_mismatch() {
        let camera = ColmapCamera {
            model_id: CameraModelId::CameraModelOpenCV,
            ..sample_camera()
        };
        let res = write_cameras(&mut Vec::new(), &[camera]);
        assert!(matches!(res, Err(ColmapError::InvalidNumCameraParams(4))));
    }

    #[test]
    fn test_write_images_format() -> Result<(), ColmapError> {
        let image = ColmapImage {
            name: "frame_00000.png".to_string(),
            image_id: 1,
            camera_id: 0,
            rotation: [0.5, -0.5, 0.25, 1.0],
            translation: [0.0, 1.5, -2.0],
            points2d: vec![],
        };
        let mut buf = Vec::new();
        write_images(&mut buf, &[image])?;
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "# Image list with two lines of data per image:\n\
             # IMAGE_ID, QVEC (w, x, y, z), TVEC (x, y, z), CAMERA_ID, NAME\n\
             # POINTS2D[] as (x, y, POINT3D_ID)\n\
             1 0.5 -0.5 0.25 1.0 0.0 1.5 -2.0 0 frame_00000.png\n\
             \n"
        );
        Ok(())
    }

    #[test]
    fn test_write_points3d_format() -> Result<(), ColmapError> {
        let point = ColmapPoint3d {
            point3d_id: 0,
            xyz: [0.1, -0.2, 3.0],
            rgb: [255, 255, 255],
            error: 1.0,
            track: vec![(0, 0), (1, 0)],
        };
        let mut buf = Vec::new();
        write_points3d(&mut buf, &[point])?;
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text.lines().last(),
            Some("0 0.1 -0.2 3.0 255 255 255 1.0 0 0 1 0")
        );
        Ok(())
    }

    #[test]
    fn test_parse_camera_line() -> Result<(), ColmapError> {
        let camera = parse_camera_line("3 OPENCV 10 20 1 2 3 4 0 0 0 0")?;
        assert_eq!(camera.camera_id, 3);
        assert_eq!(camera.model_id, CameraModelId::CameraModelOpenCV);
        assert_eq!(camera.params.len(), 8);
        assert!(matches!(
            parse_camera_line("3 PINHOLE 10 20 1 2 3"),
            Err(ColmapError::InvalidNumCameraParams(3))
        ));
        Ok(())
    }

    #[test]
    fn test_staged_writer_commits_together() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;

        let mut writer = ColmapTextWriter::new(tmp_dir.path());
        writer.stage_cameras(&[sample_camera()])?;
        writer.stage_images(&[])?;
        writer.stage_points3d(&[])?;
        assert!(!tmp_dir.path().join(CAMERAS_TXT).exists());

        let paths = writer.commit()?;
        assert_eq!(paths.len(), 3);
        assert_eq!(read_cameras_txt(tmp_dir.path().join(CAMERAS_TXT))?, vec![sample_camera()]);
        assert!(read_images_txt(tmp_dir.path().join(IMAGES_TXT))?.is_empty());
        assert!(read_points3d_txt(tmp_dir.path().join(POINTS3D_TXT))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_staged_writer_dropped_leaves_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        {
            let mut writer = ColmapTextWriter::new(tmp_dir.path());
            writer.stage_cameras(&[sample_camera()])?;
        }
        assert_eq!(std::fs::read_dir(tmp_dir.path())?.count(), 0);
        Ok(())
    }
}
