use holiday_ngin::record::{
    CAPTURE_FPS, CaptureFormat, RECORD_SECONDS, RecordSettings, Recorder, Recording,
    padded_bytes_per_row, recording_stem, unpad_rows,
};
use image::{Rgba, RgbaImage};

fn frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]))
}

/// Feeds a 60 Hz frame loop into the recorder until it hands out a recording.
fn record(recorder: &mut Recorder, start: f32, width: u32, height: u32) -> (Recording, f32) {
    let mut now = start;
    loop {
        if recorder.should_capture(now) {
            recorder.push_frame(now, frame(width, height));
        }
        if let Some(recording) = recorder.finish_if_due(now) {
            return (recording, now);
        }
        now += 1.0 / 60.0;
        assert!(now < start + 60.0, "the recorder never stopped");
    }
}

#[test]
fn recording_stops_after_its_duration() {
    let mut recorder = Recorder::default();
    assert_eq!(recorder.start(2.0, 320, 240), Some(CaptureFormat::Gif));
    assert!(recorder.is_recording());

    let (recording, stopped) = record(&mut recorder, 2.0, 320, 240);
    assert!(!recorder.is_recording());
    assert!((stopped - (2.0 + RECORD_SECONDS)).abs() < 0.05, "stopped at {stopped}");

    let expected = (CAPTURE_FPS as f32 * RECORD_SECONDS) as usize;
    let frames = recording.frames.len();
    assert!(frames.abs_diff(expected) <= 2, "{frames} frames, expected about {expected}");
    assert_eq!(recording.fps, CAPTURE_FPS);
}

#[test]
fn second_start_while_recording_is_ignored() {
    let mut recorder = Recorder::default();
    assert!(recorder.start(0.0, 100, 100).is_some());
    assert!(recorder.start(1.0, 100, 100).is_none());
    assert!(recorder.is_recording());
}

#[test]
fn idle_recorder_captures_nothing() {
    let mut recorder = Recorder::default();
    assert!(!recorder.should_capture(0.0));
    recorder.push_frame(0.0, frame(4, 4));
    assert_eq!(recorder.frame_count(), 0);
    assert!(recorder.finish_if_due(100.0).is_none());
}

#[test]
fn stalled_frame_loop_does_not_burst() {
    let mut recorder = Recorder::default();
    recorder.start(0.0, 64, 64);
    recorder.push_frame(0.0, frame(64, 64));
    // two seconds without frames
    assert!(recorder.should_capture(2.0));
    recorder.push_frame(2.0, frame(64, 64));
    assert!(!recorder.should_capture(2.01));
    assert_eq!(recorder.frame_count(), 2);
}

#[test]
fn formats_fall_back_in_preference_order() {
    assert_eq!(CaptureFormat::PREFERENCE[0], CaptureFormat::Gif);
    assert_eq!(CaptureFormat::preferred(640, 480), Some(CaptureFormat::Gif));
    assert!(!CaptureFormat::Gif.is_supported(70_000, 10));
    assert_eq!(CaptureFormat::preferred(70_000, 10), Some(CaptureFormat::PngSequence));
    assert_eq!(CaptureFormat::preferred(0, 10), None);

    let mut recorder = Recorder::new(RecordSettings {
        max_width: u32::MAX,
        ..RecordSettings::default()
    });
    assert_eq!(recorder.start(0.0, 70_000, 2), Some(CaptureFormat::PngSequence));
    assert_eq!(recorder.format(), Some(CaptureFormat::PngSequence));
}

#[test]
fn wide_frames_are_scaled_to_the_capture_size() {
    let settings = RecordSettings::default();
    assert_eq!(settings.capture_size(1280, 720), (640, 360));
    assert_eq!(settings.capture_size(320, 200), (320, 200));

    let mut recorder = Recorder::new(settings);
    recorder.start(0.0, 1280, 720);
    let (recording, _) = record(&mut recorder, 0.0, 1280, 720);
    assert!(recording.frames.iter().all(|f| f.dimensions() == (640, 360)));
}

#[test]
fn gif_encoding_writes_a_looping_gif() {
    let recording = Recording {
        format: CaptureFormat::Gif,
        fps: 15,
        frames: vec![frame(8, 6), frame(8, 6), frame(8, 6)],
    };
    let mut bytes = Vec::new();
    recording.encode_gif(&mut bytes).expect("encoding a small gif");
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 8);
    assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 6);
}

#[test]
fn empty_recordings_fail_to_encode() {
    let recording = Recording {
        format: CaptureFormat::Gif,
        fps: 15,
        frames: Vec::new(),
    };
    assert!(recording.encode_gif(Vec::new()).is_err());
}

#[test]
fn png_sequences_land_in_their_own_directory() {
    let dir = std::env::temp_dir().join(format!("holiday-ngin-test-{}", std::process::id()));
    let recording = Recording {
        format: CaptureFormat::PngSequence,
        fps: 15,
        frames: vec![frame(4, 4), frame(4, 4)],
    };
    let path = recording.save(&dir, "clip").expect("writing png frames");
    assert_eq!(path, dir.join("clip"));
    assert!(path.join("frame-0000.png").is_file());
    assert!(path.join("frame-0001.png").is_file());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stems_carry_the_timestamp() {
    assert_eq!(recording_stem(1_700_000_000), "holiday-1700000000");
}

#[test]
fn readback_rows_are_unpadded() {
    let (width, height) = (3, 2);
    let pitch = padded_bytes_per_row(width) as usize;
    assert_eq!(pitch % 256, 0);
    assert!(pitch >= 12);

    let mut data = vec![0u8; pitch * height as usize];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let i = y * pitch + x * 4;
            data[i..i + 4].copy_from_slice(&[1, 2, 3, (x + y) as u8]);
        }
    }
    let rgba = unpad_rows(&data, width, height, false).expect("complete buffer");
    assert_eq!(rgba.get_pixel(2, 1), &Rgba([1, 2, 3, 3]));
    let swizzled = unpad_rows(&data, width, height, true).expect("complete buffer");
    assert_eq!(swizzled.get_pixel(0, 0), &Rgba([3, 2, 1, 0]));

    assert!(unpad_rows(&data[..pitch], width, height, false).is_none());
}
