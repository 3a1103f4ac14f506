use binrw::binrw;
use cgmath::Vector3;

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct DfVector3(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))]
    #[bw(map = |v: &Vector3<f32>| [v.x, v.y, v.z])]
    pub Vector3<f32>,
);

impl DfVector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        DfVector3(Vector3::new(x, y, z))
    }

    pub fn to_slice(&self) -> [f32; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }

    pub fn from_slice(s: &[f32; 3]) -> Self {
        DfVector3(Vector3::new(s[0], s[1], s[2]))
    }

    pub fn is_finite(&self) -> bool {
        self.0.x.is_finite() && self.0.y.is_finite() && self.0.z.is_finite()
    }
}

impl Default for DfVector3 {
    fn default() -> Self {
        DfVector3(Vector3::new(0.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_from_slice_roundtrip() {
        let v = DfVector3::new(1.5, -2.25, 3.0);
        assert_eq!(DfVector3::from_slice(&v.to_slice()), v);
    }

    #[test]
    fn finite_check_catches_nan() {
        assert!(DfVector3::new(0.0, 1.0, 2.0).is_finite());
        assert!(!DfVector3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!DfVector3::new(0.0, f32::INFINITY, 0.0).is_finite());
    }
}
