use fod_lobes::DirectionSet;
use nalgebra::Vector3;

/// Catalogue directions closest to the x and z axes.
pub fn axis_peaks(dirs: &DirectionSet) -> [usize; 2] {
    let x = dirs.nearest(&Vector3::x()).expect("non-empty catalogue");
    let z = dirs.nearest(&Vector3::z()).expect("non-empty catalogue");
    [x, z]
}

/// Sharp axially symmetric lobes centred on the given catalogue directions:
/// `max_k |d · p_k|^exponent + floor`.
pub fn peaked_field(dirs: &DirectionSet, peaks: &[usize], exponent: i32, floor: f32) -> Vec<f32> {
    dirs.dirs()
        .iter()
        .map(|d| {
            let sharp = peaks
                .iter()
                .map(|&p| d.dot(dirs.dir(p)).abs().powi(exponent))
                .fold(0.0f32, f32::max);
            sharp + floor
        })
        .collect()
}

/// Ring of `n` directions in the xy plane, each adjacent to its two neighbours.
pub fn ring(n: usize) -> DirectionSet {
    let dirs = (0..n)
        .map(|i| {
            let a = std::f32::consts::PI * i as f32 / n as f32;
            Vector3::new(a.cos(), a.sin(), 0.0)
        })
        .collect();
    let adjacency = (0..n).map(|i| vec![(i + n - 1) % n, (i + 1) % n]).collect();
    DirectionSet::with_adjacency(dirs, adjacency).expect("valid ring")
}

/// Angle between two axes in degrees.
pub fn axis_angle_deg(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    a.dot(b).abs().min(1.0).acos().to_degrees()
}
