//! Target device strings such as `cpu` or `cuda:0`.

/// Target compute device.
///
/// The string is passed through untouched; only adapters interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device(String);

impl Device {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// The host CPU.
    pub fn cpu() -> Self {
        Self("cpu".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Device family, the part before `:`.
    pub fn family(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// Device ordinal after `:`, if present and numeric.
    pub fn index(&self) -> Option<usize> {
        self.0.split_once(':').and_then(|(_, idx)| idx.parse().ok())
    }

    pub fn is_cpu(&self) -> bool {
        self.family().eq_ignore_ascii_case("cpu")
    }

    pub fn is_cuda(&self) -> bool {
        self.family().eq_ignore_ascii_case("cuda")
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::cpu()
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Device {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

impl From<String> for Device {
    fn from(spec: String) -> Self {
        Self(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuda_with_index() {
        let device = Device::from("cuda:1");
        assert!(device.is_cuda());
        assert!(!device.is_cpu());
        assert_eq!(device.family(), "cuda");
        assert_eq!(device.index(), Some(1));
    }

    #[test]
    fn test_default_is_cpu() {
        let device = Device::default();
        assert!(device.is_cpu());
        assert_eq!(device.index(), None);
        assert_eq!(device.to_string(), "cpu");
    }

    #[test]
    fn test_opaque_strings_pass_through() {
        let device = Device::new("npu:abc");
        assert_eq!(device.family(), "npu");
        assert_eq!(device.index(), None);
        assert_eq!(device.as_str(), "npu:abc");
    }
}
