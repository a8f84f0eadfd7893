use saathi_voice::audio::{
    CaptureConfig, DeviceError, DeviceFactory, FileDevices, OutputSink, PlaybackConfig, WavSink,
};

fn write_fixture(path: &std::path::Path, sample_rate: u32, samples: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..samples {
        writer.write_sample((i % 100) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[tokio::test]
async fn file_input_delivers_fixed_size_frames() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("speech.wav");
    write_fixture(&input_path, 16000, 2000);

    let devices = FileDevices::new(&input_path, dir.path().join("out.wav"));
    let config = CaptureConfig {
        sample_rate: 16000,
        frame_size: 800,
    };

    let mut input = devices.open_input(&config).await.unwrap();
    let mut frames = input.start().await.unwrap();

    let mut sizes = Vec::new();
    while let Some(frame) = frames.recv().await {
        assert_eq!(frame.sample_rate, 16000);
        sizes.push(frame.samples.len());
    }

    assert_eq!(sizes, vec![800, 800, 400], "fixed frames plus a short tail");
    input.stop().await.unwrap();
}

#[tokio::test]
async fn file_input_rejects_mismatched_format() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("wrong-rate.wav");
    write_fixture(&input_path, 44100, 100);

    let devices = FileDevices::new(&input_path, dir.path().join("out.wav"));
    let Err(err) = devices.open_input(&CaptureConfig::default()).await else {
        panic!("expected a format error");
    };

    assert!(matches!(err, DeviceError::Unsupported(_)));
}

#[tokio::test]
async fn missing_capture_file_maps_to_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let devices = FileDevices::new(dir.path().join("absent.wav"), dir.path().join("out.wav"));

    let Err(err) = devices.open_input(&CaptureConfig::default()).await else {
        panic!("expected an error for the missing file");
    };
    assert!(matches!(err, DeviceError::NotFound));
}

#[tokio::test]
async fn wav_sink_renders_the_timeline_with_silence_fill() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("reply.wav");

    let mut sink = WavSink::create(&out_path, 24000).unwrap();
    assert_eq!(sink.now(), 0.0);

    // Schedule 0.1s of audio half a second into the timeline
    sink.play(0, vec![0.5; 2400], 0.5).unwrap();
    assert!((sink.now() - 0.6).abs() < 1e-9);
    assert_eq!(sink.finished(), vec![0]);

    sink.close().await.unwrap();

    let reader = hound::WavReader::open(&out_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 24000);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 14400, "0.5s silence + 0.1s audio at 24kHz");
    assert_eq!(samples[0], 0, "gap is silence");
    assert!(samples[12000] > 16000, "scheduled audio follows the gap");
}

#[tokio::test]
async fn stopped_entry_is_not_reported_finished() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = WavSink::create(&dir.path().join("reply.wav"), 24000).unwrap();

    sink.play(7, vec![0.0; 240], 0.0).unwrap();
    sink.stop(7);

    assert!(sink.finished().is_empty());
    sink.close().await.unwrap();
}

#[tokio::test]
async fn output_sink_opens_at_the_playback_rate() {
    let dir = tempfile::tempdir().unwrap();
    let devices = FileDevices::new(dir.path().join("in.wav"), dir.path().join("reply.wav"));

    let mut sink = devices.open_output(&PlaybackConfig::default()).await.unwrap();
    sink.close().await.unwrap();

    let reader = hound::WavReader::open(dir.path().join("reply.wav")).unwrap();
    assert_eq!(reader.spec().sample_rate, 24000);
    assert_eq!(reader.spec().channels, 1);
}
