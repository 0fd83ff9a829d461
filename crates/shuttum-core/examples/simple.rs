use shuttum_core::{
    Camera, CameraRig, GroundTruthPose, ImuReading, MatchPolicy, Sequence, Shutter,
    loader::{FrameRow, RawTables},
    params::TimeConfig,
};

fn main() -> eyre::Result<()> {
    let frame_seq = &[1.0, 2.0, 3.0];
    let imu_seq = &[0.9, 1.4, 1.9, 2.4, 2.9];
    let mocap_seq = &[1.0, 3.0];

    // Describe the cameras of both stereo rigs
    let cameras = CameraRig::new([
        Camera::new("cam1", Shutter::Global),
        Camera::new("cam2", Shutter::Global),
        Camera::new("cam3", Shutter::Rolling).with_row_delay(0.03),
        Camera::new("cam4", Shutter::Rolling).with_row_delay(0.03),
    ]);

    // The rows as they would be read from the data files
    let raw = RawTables {
        frames: frame_seq
            .iter()
            .enumerate()
            .map(|(id, &stamp)| FrameRow {
                stamp,
                id: id as u64,
                exposures: vec![5.0; 4],
            })
            .collect(),
        imu: imu_seq
            .iter()
            .map(|&stamp| ImuReading {
                stamp,
                acceleration: [0.0, 0.0, 9.81],
                angular_velocity: [0.0, 0.0, 0.1],
            })
            .collect(),
        groundtruth: mocap_seq
            .iter()
            .map(|&stamp| GroundTruthPose {
                stamp,
                position: [stamp, 0.0, 0.0],
                orientation: [1.0, 0.0, 0.0, 0.0],
            })
            .collect(),
    };
    let time = TimeConfig {
        start: 0.9,
        end: 3.0,
        duration: 2.1,
    };

    let sequence = Sequence::from_tables("simple", time, cameras, raw)?;

    // Everything that was recorded at the same instant
    for record in sequence.range(None, None) {
        let modalities: Vec<_> = record.modalities().map(|m| m.to_string()).collect();
        println!("{:>4}: {}", record.stamp, modalities.join(", "));
    }

    // Interpolate the motion capture pose for every global frame
    for frame in sequence.frames(Shutter::Global) {
        let pose = frame.groundtruth(MatchPolicy::Linear)?;
        println!("frame {} -> {pose:?}", frame.id);
    }

    Ok(())
}
