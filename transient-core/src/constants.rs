pub const PI: f64 = std::f64::consts::PI;

pub const DEG_TO_RAD: f64 = PI / 180.0;

pub const RAD_TO_DEG: f64 = 180.0 / PI;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

pub const ARCSEC_PER_ARCMIN: f64 = 60.0;

