#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

/// Solid angle of the whole sphere, in steradians.
#[allow(clippy::excessive_precision)]
pub const FOUR_PI: f64 = 12.566370614359172953850574;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Square degrees in one steradian, `(180/π)²`.
#[allow(clippy::excessive_precision)]
pub const SQ_DEG_PER_SR: f64 = 3282.806350011743794781695;
