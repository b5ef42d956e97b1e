use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use scene_annotator::capture::{CaptureDriver, ConsoleProgress, LogProgress, ProgressObserver};
use scene_annotator::core::{AssembleConfig, CaptureConfig, Config};
use scene_annotator::dataset::DatasetAssembler;
use scene_annotator::foundation::logging;
use scene_annotator::imaging::{overlay_tree, resize_tree, DEFAULT_TARGET_SIZE};
use scene_annotator::scene::SceneProvider;
use scene_annotator::sweep::Sweep;

fn cli() -> Command {
    Command::new("annotator")
        .about("Renders parameter sweeps of a 3D scene and writes detection labels for every image")
        .version(clap::crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("FILTER")
                .help("Log filter used when RUST_LOG is not set")
                .default_value("info")
                .global(true),
        )
        .subcommand(
            Command::new("capture")
                .about("Run a capture sweep")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Capture configuration (.toml or .ron)")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Override the output directory")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("List configurations without rendering")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Report progress through the log instead of the console")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("assemble")
                .about("Split captures into a train/test dataset")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Assembly configuration (.toml or .ron)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .value_name("DIR")
                        .help("Directory tree of captures")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("dest")
                        .short('d')
                        .long("dest")
                        .value_name("DIR")
                        .help("Dataset root to create")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("split")
                        .long("split")
                        .value_name("RATIO")
                        .help("Fraction of pairs used for training")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Shuffle seed")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("class")
                        .long("class")
                        .value_name("NAME")
                        .help("Class name, in class id order; repeat for several classes")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("overlay")
                .about("Draw label boxes over labelled images")
                .arg(
                    Arg::new("source")
                        .value_name("DIR")
                        .help("Directory tree of images and labels")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Directory receiving the overlays")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("overlays"),
                ),
        )
        .subcommand(
            Command::new("resize")
                .about("Scale images to a height and center-crop them square, in place")
                .arg(
                    Arg::new("root")
                        .value_name("DIR")
                        .help("Directory tree of images")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_name("PIXELS")
                        .help("Output edge length")
                        .value_parser(value_parser!(u32))
                        .default_value("640"),
                ),
        )
        .subcommand(
            Command::new("init-config")
                .about("Write a default configuration file")
                .arg(
                    Arg::new("kind")
                        .value_name("KIND")
                        .help("Which configuration to write")
                        .value_parser(["capture", "assemble"])
                        .required(true),
                )
                .arg(
                    Arg::new("path")
                        .value_name("FILE")
                        .help("Destination (.toml or .ron)")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Overwrite an existing file")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let level = matches.get_one::<String>("log-level").map_or("info", String::as_str);
    logging::init(level);

    match matches.subcommand() {
        Some(("capture", sub)) => run_capture(sub),
        Some(("assemble", sub)) => run_assemble(sub),
        Some(("overlay", sub)) => run_overlay(sub),
        Some(("resize", sub)) => run_resize(sub),
        Some(("init-config", sub)) => run_init_config(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn required_path<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .with_context(|| format!("Missing argument '{id}'"))
}

fn run_capture(matches: &ArgMatches) -> Result<()> {
    let config_path = required_path(matches, "config")?;
    let mut config = CaptureConfig::load_from_file(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.output.output_dir.clone_from(output);
    }
    config.validate().context("Invalid capture configuration")?;

    let mut scene = config.build_scene().context("Failed to build scene")?;
    let plan = config.sweep_plan().context("Invalid sweep")?;
    let sweep = Sweep::new(&plan, &scene.baseline()).context("Invalid sweep")?;
    log::info!("Sweep has {} configurations over {} frames", sweep.len(), sweep.frame_count());

    if matches.get_flag("dry-run") {
        for configuration in &sweep {
            println!(
                "{:04} frame={} orbit={:.1} lens={:.1} rotation={:.1} kelvin={} opening={:.1}{} material={}",
                configuration.subframe_index,
                configuration.frame_index,
                configuration.orbit_angle,
                configuration.lens_mm,
                configuration.rotation_degrees,
                configuration.light_tone.kelvin,
                configuration.opening_degrees,
                if configuration.mirrored { " mirrored" } else { "" },
                configuration.material.as_deref().unwrap_or("-")
            );
        }
        return Ok(());
    }

    let mut renderer = config.build_renderer();
    let observer: Box<dyn ProgressObserver> = if matches.get_flag("quiet") {
        Box::new(LogProgress)
    } else {
        Box::new(ConsoleProgress)
    };
    let mut driver = CaptureDriver::new(config.output.clone()).with_observer(observer);

    // The observer reports the summary.
    let summary = driver
        .run(&sweep, &mut scene, renderer.as_mut(), &config.targets)
        .context("Capture failed to start")?;
    if summary.render_failures > 0 || summary.write_failures > 0 {
        bail!(
            "{} renders and {} label writes failed",
            summary.render_failures,
            summary.write_failures
        );
    }
    Ok(())
}

fn run_assemble(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AssembleConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => AssembleConfig::default(),
    };
    if let Some(source) = matches.get_one::<PathBuf>("source") {
        config.source.clone_from(source);
    }
    if let Some(dest) = matches.get_one::<PathBuf>("dest") {
        config.dest.clone_from(dest);
    }
    if let Some(split) = matches.get_one::<f64>("split") {
        config.options.split_ratio = *split;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.options.seed = *seed;
    }
    if let Some(classes) = matches.get_many::<String>("class") {
        config.options.class_names = classes.cloned().collect();
    }
    config.validate().context("Invalid assembly configuration")?;

    let manifest = DatasetAssembler::new(config.options.clone())
        .assemble(&config.source, &config.dest)
        .with_context(|| format!("Failed to assemble {}", config.source.display()))?;
    println!(
        "Dataset written to {}: {} train, {} test, {} skipped",
        manifest.root.display(),
        manifest.train.len(),
        manifest.test.len(),
        manifest.skipped.len()
    );
    Ok(())
}

fn run_overlay(matches: &ArgMatches) -> Result<()> {
    let source = required_path(matches, "source")?;
    let output = required_path(matches, "output")?;
    let summary = overlay_tree(source, output)
        .with_context(|| format!("Failed to overlay {}", source.display()))?;
    println!(
        "Wrote {} overlays to {} ({} failed)",
        summary.written.len(),
        output.display(),
        summary.failed
    );
    Ok(())
}

fn run_resize(matches: &ArgMatches) -> Result<()> {
    let root = required_path(matches, "root")?;
    let size = matches.get_one::<u32>("size").copied().unwrap_or(DEFAULT_TARGET_SIZE);
    let summary = resize_tree(root, size).with_context(|| format!("Failed to resize {}", root.display()))?;
    println!("Resized {} images ({} failed)", summary.processed, summary.failed);
    Ok(())
}

fn run_init_config(matches: &ArgMatches) -> Result<()> {
    let path = required_path(matches, "path")?;
    if path.exists() && !matches.get_flag("force") {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }

    match matches.get_one::<String>("kind").map(String::as_str) {
        Some("assemble") => AssembleConfig::default().save_to_file(path),
        _ => CaptureConfig::default().save_to_file(path),
    }
    .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_assemble_collects_repeated_classes() {
        let matches = cli()
            .try_get_matches_from(["annotator", "assemble", "--class", "cable", "--class", "plug", "--split", "0.75"])
            .expect("parse arguments");
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "assemble");

        let classes: Vec<&String> = sub.get_many::<String>("class").expect("classes").collect();
        assert_eq!(classes, ["cable", "plug"]);
        assert_eq!(sub.get_one::<f64>("split"), Some(&0.75));
    }

    #[test]
    fn test_init_config_rejects_unknown_kind() {
        assert!(cli().try_get_matches_from(["annotator", "init-config", "render", "out.toml"]).is_err());
    }
}
