//! `info` command implementation.

use super::open_sequence;
use crate::cli::InfoArgs;
use eyre::{Result, WrapErr};
use serde::Serialize;
use shuttum_core::{ExposureLimits, Modality, Resolution, Sequence, Shutter};

#[derive(Serialize)]
struct SequenceInfo {
    name: String,
    path: String,
    start: f64,
    end: f64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    resolution: Resolution,
    stereosync: bool,
    stamps: usize,
    streams: Vec<StreamInfo>,
    cameras: Vec<CameraInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exposure_limits: Option<ExposureLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rolling_shutter_row_delay: Option<f64>,
}

#[derive(Serialize)]
struct StreamInfo {
    modality: Modality,
    samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<f64>,
}

#[derive(Serialize)]
struct CameraInfo {
    name: String,
    shutter: Shutter,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let sequence = open_sequence(&args.input)?;
    let info = build_info(&sequence);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).wrap_err("Failed to serialize sequence info")?;
        println!("{json}");
    } else {
        print_info(&info);
    }

    Ok(())
}

fn build_info(sequence: &Sequence) -> SequenceInfo {
    let streams = sequence.streams();
    let stream_info = |modality: Modality| {
        let range = match modality {
            Modality::GlobalFrames => streams.global.timestamp_range(),
            Modality::RollingFrames => streams.rolling.timestamp_range(),
            Modality::Imu => streams.imu.timestamp_range(),
            Modality::GroundTruth => streams.groundtruth.timestamp_range(),
        };
        StreamInfo {
            modality,
            samples: streams.count(modality),
            first: range.map(|(first, _)| first),
            last: range.map(|(_, last)| last),
        }
    };

    SequenceInfo {
        name: sequence.name(),
        path: sequence.path().display().to_string(),
        start: sequence.start(),
        end: sequence.end(),
        duration: sequence.duration(),
        start_time: sequence.start_time().map(|time| time.to_rfc3339()),
        resolution: sequence.resolution(),
        stereosync: sequence.stereosync(),
        stamps: sequence.times().len(),
        streams: Modality::ALL.into_iter().map(stream_info).collect(),
        cameras: sequence
            .shutter_types()
            .into_iter()
            .map(|(name, shutter)| CameraInfo { name, shutter })
            .collect(),
        exposure_limits: sequence.exposure_limits().ok(),
        rolling_shutter_row_delay: sequence.rolling_shutter_row_delay().ok(),
    }
}

fn print_info(info: &SequenceInfo) {
    println!("Sequence ({})", info.name);
    println!("   ├─ Path: {}", info.path);
    match &info.start_time {
        Some(time) => println!("   ├─ Start: {} ({time})", info.start),
        None => println!("   ├─ Start: {}", info.start),
    }
    println!("   ├─ End: {}", info.end);
    println!("   ├─ Duration: {:.3} s", info.duration);
    println!(
        "   ├─ Resolution: {}x{}",
        info.resolution.width, info.resolution.height
    );
    println!("   └─ Stereo sync: {}", info.stereosync);

    println!("\nStreams ({} distinct timestamps)", info.stamps);
    for (i, stream) in info.streams.iter().enumerate() {
        let prefix = if i + 1 == info.streams.len() { "└─" } else { "├─" };
        match (stream.first, stream.last) {
            (Some(first), Some(last)) => println!(
                "   {prefix} {}: {} samples [{first}, {last}]",
                stream.modality, stream.samples
            ),
            _ => println!("   {prefix} {}: no samples", stream.modality),
        }
    }

    println!("\nCameras ({})", info.cameras.len());
    for camera in &info.cameras {
        println!("   ├─ {}: {} shutter", camera.name, camera.shutter);
    }
    match info.exposure_limits {
        Some(limits) => println!("   ├─ Exposure: {} .. {} ms", limits.min, limits.max),
        None => println!("   ├─ Exposure: unknown"),
    }
    match info.rolling_shutter_row_delay {
        Some(delay) => println!("   └─ Rolling shutter row delay: {delay} ms"),
        None => println!("   └─ Rolling shutter row delay: no rolling shutter camera"),
    }
}
