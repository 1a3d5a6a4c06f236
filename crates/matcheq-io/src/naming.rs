//! Output file naming.
//!
//! Every artifact is written next to the file it was derived from, with a
//! fixed suffix appended to that file's stem.

use std::path::{Path, PathBuf};

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.wav"))
}

/// `<probe stem>_inv_filter.wav`
pub fn inverse_filter_path(probe: &Path) -> PathBuf {
    with_stem_suffix(probe, "_inv_filter")
}

/// `<first probe stem>_mean_inv_filter.wav`
pub fn mean_inverse_filter_path(first_probe: &Path) -> PathBuf {
    with_stem_suffix(first_probe, "_mean_inv_filter")
}

/// `<target stem>_corr<suffix>.wav`
pub fn corrected_path(target: &Path, suffix: &str) -> PathBuf {
    with_stem_suffix(target, &format!("_corr{suffix}"))
}

/// True for an inverse filter, or for a file corrected with `suffix`.
/// Batch listings skip these.
pub fn is_derived(path: &Path, suffix: &str) -> bool {
    let corrected = format!("_corr{suffix}");
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .is_some_and(|stem| stem.ends_with("_inv_filter") || stem.ends_with(&corrected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names() {
        assert_eq!(
            inverse_filter_path(Path::new("/data/pmx_take1.wav")),
            PathBuf::from("/data/pmx_take1_inv_filter.wav")
        );
        assert_eq!(
            mean_inverse_filter_path(Path::new("media/KU100_Repro_01.wav")),
            PathBuf::from("media/KU100_Repro_01_mean_inv_filter.wav")
        );
    }

    #[test]
    fn corrected_names_carry_suffix() {
        assert_eq!(
            corrected_path(Path::new("a/b.wav"), ""),
            PathBuf::from("a/b_corr.wav")
        );
        assert_eq!(
            corrected_path(Path::new("a/b.wav"), "2"),
            PathBuf::from("a/b_corr2.wav")
        );
    }

    #[test]
    fn derived_files_are_recognised() {
        assert!(is_derived(Path::new("x_inv_filter.wav"), ""));
        assert!(is_derived(Path::new("x_mean_inv_filter.wav"), ""));
        assert!(is_derived(Path::new("x_corr3.wav"), "3"));
        assert!(is_derived(Path::new("x_corr.wav"), ""));
        assert!(!is_derived(Path::new("KU100_Repro.wav"), ""));
    }

    #[test]
    fn names_merely_containing_markers_are_inputs() {
        assert!(!is_derived(Path::new("take_correct.wav"), ""));
        assert!(!is_derived(Path::new("take_corr_mix.wav"), ""));
        assert!(!is_derived(Path::new("inv_filter_test_take.wav"), ""));
        assert!(!is_derived(Path::new("x_corr3.wav"), ""));
        assert!(!is_derived(Path::new("x_corr.wav"), "3"));
    }

    #[test]
    fn derived_names_roundtrip() {
        let target = Path::new("media/take.wav");
        assert!(is_derived(&corrected_path(target, "v2"), "v2"));
        assert!(is_derived(&inverse_filter_path(target), "v2"));
        assert!(is_derived(&mean_inverse_filter_path(target), ""));
    }
}
