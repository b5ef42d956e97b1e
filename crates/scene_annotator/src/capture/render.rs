//! Render backends
//!
//! The driver only needs "write an image for this configuration to this
//! path". Closures work for tests and embedding; [`CommandRenderer`] hands the
//! job to an external program; [`FlatRenderer`] writes a placeholder frame so a
//! sweep can be dry-run without a renderer installed.

use std::io;
use std::path::Path;
use std::process::Command;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::scene::Resolution;
use crate::sweep::SweepConfiguration;

/// Produces the image for one configuration
pub trait Renderer {
    /// Render `config` and write the image to `output`
    ///
    /// The file must be complete when this returns `Ok`.
    fn render(&mut self, config: &SweepConfiguration, output: &Path) -> io::Result<()>;
}

impl<F> Renderer for F
where
    F: FnMut(&SweepConfiguration, &Path) -> io::Result<()>,
{
    fn render(&mut self, config: &SweepConfiguration, output: &Path) -> io::Result<()> {
        self(config, output)
    }
}

/// Writes a frame filled with the configuration's light color
#[derive(Debug, Clone)]
pub struct FlatRenderer {
    resolution: Resolution,
}

impl FlatRenderer {
    /// Renderer producing images of `resolution`
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }
}

impl Renderer for FlatRenderer {
    fn render(&mut self, config: &SweepConfiguration, output: &Path) -> io::Result<()> {
        let color = config.light_tone.color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let image = RgbImage::from_pixel(self.resolution.width, self.resolution.height, Rgb([color.x, color.y, color.z]));
        image.save(output).map_err(io::Error::other)
    }
}

/// Runs an external program once per configuration
///
/// Arguments may contain placeholders replaced per configuration: `{output}`,
/// `{index}`, `{frame}`, `{orbit}`, `{lens}`, `{rotation}`, `{kelvin}`,
/// `{opening}`, `{mirrored}` (`1` or `0`) and `{material}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRenderer {
    /// Program to run
    pub program: String,
    /// Argument templates
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandRenderer {
    /// Renderer invoking `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand(template: &str, config: &SweepConfiguration, output: &Path) -> String {
        template
            .replace("{output}", &output.to_string_lossy())
            .replace("{index}", &config.subframe_index.to_string())
            .replace("{frame}", &config.frame_index.to_string())
            .replace("{orbit}", &config.orbit_angle.to_string())
            .replace("{lens}", &config.lens_mm.to_string())
            .replace("{rotation}", &config.rotation_degrees.to_string())
            .replace("{kelvin}", &config.light_tone.kelvin.to_string())
            .replace("{opening}", &config.opening_degrees.to_string())
            .replace("{mirrored}", if config.mirrored { "1" } else { "0" })
            .replace("{material}", config.material.as_deref().unwrap_or(""))
    }

    /// Arguments for one configuration
    pub fn arguments(&self, config: &SweepConfiguration, output: &Path) -> Vec<String> {
        self.args.iter().map(|arg| Self::expand(arg, config, output)).collect()
    }
}

impl Renderer for CommandRenderer {
    fn render(&mut self, config: &SweepConfiguration, output: &Path) -> io::Result<()> {
        let args = self.arguments(config, output);
        log::trace!("Running renderer: {} {:?}", self.program, args);

        let status = Command::new(&self.program).args(&args).status()?;
        if !status.success() {
            return Err(io::Error::other(format!("{} exited with {}", self.program, status)));
        }
        if !output.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not write {}", self.program, output.display()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::LightTone;

    fn config() -> SweepConfiguration {
        SweepConfiguration {
            subframe_index: 12,
            frame_index: 1,
            orbit_angle: -65.0,
            lens_mm: 50.0,
            rotation_degrees: 15.0,
            light_position: Vec3::new(0.6, 0.6, 2.0),
            light_tone: LightTone::from_kelvin(4500),
            opening_degrees: 75.0,
            jitter: false,
            mirrored: true,
            material: Some("red".to_string()),
        }
    }

    #[test]
    fn test_closures_are_renderers() {
        let mut calls = Vec::new();
        let mut renderer = |config: &SweepConfiguration, _: &Path| -> io::Result<()> {
            calls.push(config.subframe_index);
            Ok(())
        };
        renderer.render(&config(), Path::new("unused.png")).expect("closure render");
        assert_eq!(calls, vec![12]);
    }

    #[test]
    fn test_command_placeholders() {
        let renderer = CommandRenderer::new(
            "blender",
            vec![
                "--out={output}".to_string(),
                "{lens}mm".to_string(),
                "{index}:{kelvin}:{material}".to_string(),
                "--hinge={opening}/{mirrored}".to_string(),
            ],
        );
        let args = renderer.arguments(&config(), Path::new("out/frame_0012.png"));
        assert_eq!(args, vec!["--out=out/frame_0012.png", "50mm", "12:4500:red", "--hinge=75/1"]);
    }

    #[test]
    fn test_flat_renderer_writes_light_color() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("flat.png");
        let mut config = config();
        config.light_tone = LightTone::from_color(Vec3::new(1.0, 0.2, 0.0));
        FlatRenderer::new(Resolution::new(8, 4)).render(&config, &path).expect("render");

        let image = image::open(&path).expect("open rendered image").to_rgb8();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(3, 2), &Rgb([255, 51, 0]));
    }
}
