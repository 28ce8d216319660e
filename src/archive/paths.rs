//! Cache-directory file naming.
//!
//! The cache holds one directory volume plus numbered volumes, zero-padded
//! to three digits to match the archive's own naming (`pak01_007.vpk`).

/// File name of the directory volume inside the cache directory.
pub const DIRECTORY_VOLUME_NAME: &str = "pak01_dir.vpk";

/// File name of a numbered archive volume.
pub fn volume_file_name(index: u16) -> String {
    format!("pak01_{index:03}.vpk")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_small_indices_to_three_digits() {
        assert_eq!(volume_file_name(0), "pak01_000.vpk");
        assert_eq!(volume_file_name(7), "pak01_007.vpk");
        assert_eq!(volume_file_name(42), "pak01_042.vpk");
    }

    #[test]
    fn leaves_wide_indices_unpadded() {
        assert_eq!(volume_file_name(123), "pak01_123.vpk");
        assert_eq!(volume_file_name(1000), "pak01_1000.vpk");
    }
}
