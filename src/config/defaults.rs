//! Default value functions for serde deserialization.

pub fn angular_resolution_deg() -> f64 {
    5.0
}

pub fn floor_divisor() -> f64 {
    1024.0
}

pub fn cloud_size() -> usize {
    10_000
}

pub fn resample_interval() -> usize {
    2
}

pub fn update_min_d() -> f64 {
    0.2
}

pub fn update_min_a() -> f64 {
    std::f64::consts::PI / 6.0
}

pub fn enabled() -> bool {
    true
}
