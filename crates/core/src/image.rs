//! Object-key derivation for built device images.

/// Derive the object-store key for a built device image.
///
/// The key is a pure function of the request:
/// `<prefix>/<device_type>/<version>/image/balena.img`. An unspecified
/// version produces an empty segment, which is unusual but well-formed.
pub fn image_key(prefix: &str, device_type: &str, version: &str) -> String {
    format!("{prefix}/{device_type}/{version}/image/balena.img")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shape() {
        assert_eq!(
            image_key("images", "raspberrypi4-64", "v2.95.1"),
            "images/raspberrypi4-64/v2.95.1/image/balena.img"
        );
    }

    #[test]
    fn empty_version_keeps_segment() {
        assert_eq!(
            image_key("images", "intel-nuc", ""),
            "images/intel-nuc//image/balena.img"
        );
    }

    #[test]
    fn key_is_deterministic() {
        let a = image_key("p", "dt", "v1");
        let b = image_key("p", "dt", "v1");
        assert_eq!(a, b);
    }
}
