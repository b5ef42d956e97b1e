//! # Core Module
//!
//! Run configuration shared by the library and the command-line front end.
//!
//! ## Organization
//!
//! - **Config**: capture and assembly configuration files

pub mod config;

pub use config::{
    AssembleConfig, CameraSection, CaptureConfig, Config, ConfigError, LinearRange, ObjectSpec, OrbitFrames,
    RendererConfig, SceneSection, SteppedRange, SweepSection,
};
