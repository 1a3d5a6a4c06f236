//! Integration tests for matcheq-io: the file-level workflows.

use matcheq_analysis::export::export_frd;
use matcheq_analysis::{DesignConfig, EstimatorConfig, integrated_loudness};
use matcheq_core::AudioBuffer;
use matcheq_io::{
    Error, FilePair, GainMode, MatchEngine, WavFormat, WavSpec, naming, read_wav, read_wav_info,
    write_wav,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SR: u32 = 48000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn noise(len: usize, amplitude: f64, seed: u32) -> Vec<f64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amplitude * (state as i32 as f64) / (i32::MAX as f64)
        })
        .collect()
}

fn two_tap_average(x: &[f64]) -> Vec<f64> {
    (0..x.len())
        .map(|i| 0.5 * (x[i] + if i > 0 { x[i - 1] } else { 0.0 }))
        .collect()
}

fn write_file(dir: &Path, name: &str, buffer: &AudioBuffer, spec: WavSpec) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, buffer, spec).unwrap();
    path
}

fn mono(samples: Vec<f64>) -> AudioBuffer {
    AudioBuffer::from_mono(samples, SR)
}

fn engine() -> MatchEngine {
    MatchEngine::new(
        EstimatorConfig::default(),
        DesignConfig {
            ntaps: 255,
            ..Default::default()
        },
    )
    .unwrap()
}

fn calibration_pair(dir: &Path, seed: u32) -> FilePair {
    let reference = noise(2 * SR as usize, 0.5, seed);
    let probe = two_tap_average(&reference);
    FilePair::new(
        write_file(dir, &format!("ref_{seed}.wav"), &mono(reference), WavSpec::float32(1, SR)),
        write_file(dir, &format!("pmx_{seed}.wav"), &mono(probe), WavSpec::float32(1, SR)),
    )
}

// ---------------------------------------------------------------------------
// Calibrate: one filter + one gain reused for a batch
// ---------------------------------------------------------------------------

#[test]
fn calibrate_then_correct_batch_with_fixed_gain() {
    let dir = TempDir::new().unwrap();
    let pair = calibration_pair(dir.path(), 11);
    let engine = engine();

    let filter = engine.write_inverse_filter(&pair).unwrap();
    assert_eq!(filter.path, naming::inverse_filter_path(&pair.probe));
    let gain = engine.calibration_gain(std::slice::from_ref(&pair), &filter.path).unwrap();
    assert!(gain.is_finite() && gain > 0.0);

    let stereo = AudioBuffer::new(vec![noise(SR as usize, 0.3, 21), noise(SR as usize, 0.2, 22)], SR);
    let target = write_file(dir.path(), "arceau.wav", &stereo, WavSpec::pcm24(2, SR));

    let corrected = engine
        .apply_correction(&target, &filter.path, &GainMode::Fixed(gain), "")
        .unwrap();

    assert_eq!(corrected.gain, gain);
    let info = read_wav_info(&corrected.path).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.bits_per_sample, 24);
    assert_eq!(info.format, WavFormat::Pcm);
    assert_eq!(info.num_frames, SR as u64 + 254);
}

#[test]
fn fixed_gain_output_matches_loudness_matched_output() {
    let dir = TempDir::new().unwrap();
    let pair = calibration_pair(dir.path(), 12);
    let engine = engine();
    let filter = engine.write_inverse_filter(&pair).unwrap();

    let gain = engine.calibration_gain(std::slice::from_ref(&pair), &filter.path).unwrap();

    let matched = engine
        .apply_correction(&pair.probe, &filter.path, &GainMode::MatchReference(pair.reference.clone()), "a")
        .unwrap();
    let fixed = engine
        .apply_correction(&pair.probe, &filter.path, &GainMode::Fixed(gain), "b")
        .unwrap();

    assert_eq!(matched.gain, gain);
    let (a, _) = read_wav(&matched.path).unwrap();
    let (b, _) = read_wav(&fixed.path).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Mean filter over several pairs
// ---------------------------------------------------------------------------

#[test]
fn mean_filter_and_averaged_gain() {
    let dir = TempDir::new().unwrap();
    let pairs = [calibration_pair(dir.path(), 31), calibration_pair(dir.path(), 32)];
    let engine = engine();

    let filter = engine.write_mean_inverse_filter(&pairs).unwrap();
    assert_eq!(filter.path, naming::mean_inverse_filter_path(&pairs[0].probe));
    // 13 frames of 8192 (hop 7168) per 2 s file
    assert_eq!(filter.curve.frames, 26);

    let both = engine.calibration_gain(&pairs, &filter.path).unwrap();
    let first = engine.calibration_gain(&pairs[..1], &filter.path).unwrap();
    let second = engine.calibration_gain(&pairs[1..], &filter.path).unwrap();
    assert!((both - 0.5 * (first + second)).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Loudness equalization
// ---------------------------------------------------------------------------

#[test]
fn equalize_matches_first_file_and_keeps_format() {
    let dir = TempDir::new().unwrap();
    let files = vec![
        write_file(dir.path(), "close_front.wav", &mono(noise(2 * SR as usize, 0.4, 41)), WavSpec::float32(1, SR)),
        write_file(dir.path(), "far_front.wav", &mono(noise(2 * SR as usize, 0.1, 42)), WavSpec::pcm24(1, SR)),
        write_file(
            dir.path(),
            "side.wav",
            &AudioBuffer::new(vec![noise(2 * SR as usize, 0.05, 43); 2], SR),
            WavSpec { bits_per_sample: 16, ..WavSpec::pcm24(2, SR) },
        ),
    ];

    let gains: Vec<f64> = engine()
        .equalize_loudness(&files)
        .unwrap()
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(gains.len(), 3);
    assert_eq!(gains[0], 1.0);
    assert!(gains[1] > 1.0 && gains[2] > 1.0);

    let (first, _) = read_wav(&files[0]).unwrap();
    let target = integrated_loudness(&first).unwrap();
    for file in &files[1..] {
        let (audio, _) = read_wav(file).unwrap();
        let lufs = integrated_loudness(&audio).unwrap();
        assert!((lufs - target).abs() < 0.1, "{}: {lufs} vs {target}", file.display());
    }

    assert_eq!(read_wav_info(&files[1]).unwrap().bits_per_sample, 24);
    let side = read_wav_info(&files[2]).unwrap();
    assert_eq!(side.bits_per_sample, 16);
    assert_eq!(side.channels, 2);
}

#[test]
fn equalize_continues_past_unreadable_file() {
    let dir = TempDir::new().unwrap();
    let first = write_file(dir.path(), "a.wav", &mono(noise(2 * SR as usize, 0.5, 44)), WavSpec::float32(1, SR));
    let missing = dir.path().join("missing.wav");
    let last = write_file(dir.path(), "c.wav", &mono(noise(2 * SR as usize, 0.05, 44)), WavSpec::float32(1, SR));

    let results = engine().equalize_loudness(&[first, missing, last.clone()]).unwrap();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[1], Err(Error::Io(_))));

    let gain = *results[2].as_ref().unwrap();
    assert!((gain - 10.0).abs() < 1e-3, "gain {gain}");
    let (audio, _) = read_wav(&last).unwrap();
    assert!(audio.peak() > 0.4, "peak {}", audio.peak());
}

#[test]
fn unreadable_first_file_aborts_equalize() {
    let dir = TempDir::new().unwrap();
    let files = [dir.path().join("missing.wav"), dir.path().join("other.wav")];
    assert!(matches!(engine().equalize_loudness(&files), Err(Error::Io(_))));
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

#[test]
fn missing_file_surfaces_io_error() {
    let dir = TempDir::new().unwrap();
    let pair = FilePair::new(dir.path().join("nope.wav"), dir.path().join("nada.wav"));
    let err = engine().write_inverse_filter(&pair).unwrap_err();
    assert!(matches!(err, Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound), "{err}");
}

#[test]
fn non_wav_file_surfaces_wav_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.wav");
    std::fs::write(&path, "not a riff header").unwrap();
    assert!(matches!(read_wav(&path), Err(Error::Wav(_))));
}

// ---------------------------------------------------------------------------
// Design from a saved curve
// ---------------------------------------------------------------------------

#[test]
fn filter_from_saved_curve_matches_estimate() {
    let dir = TempDir::new().unwrap();
    let pair = calibration_pair(dir.path(), 51);
    let engine = engine();
    let estimated = engine.write_inverse_filter(&pair).unwrap();

    let frd = dir.path().join("cal_curve.frd");
    export_frd(&estimated.curve, &frd).unwrap();
    let loaded = engine.write_filter_from_frd(&frd).unwrap();

    assert_eq!(loaded.path, dir.path().join("cal_curve_inv_filter.wav"));
    assert_eq!(loaded.filter.len(), 255);
    assert_eq!(read_wav_info(&loaded.path).unwrap().num_frames, 255);
    for (a, b) in loaded.filter.taps.iter().zip(estimated.filter.taps.iter()) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}
