//! Small fixed-size vector helpers over `[f64; N]`.

#[inline]
pub fn dot3(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn add3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale3(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn norm3(a: [f64; 3]) -> f64 {
    dot3(a, a).sqrt()
}

/// Unit vector in the direction of `a`; the zero vector stays zero
pub fn normalize3(a: [f64; 3]) -> [f64; 3] {
    let n = norm3(a);
    if n < 1e-12 {
        return [0.0; 3];
    }
    scale3(a, 1.0 / n)
}

/// `a + (b - a) t`
#[inline]
pub fn lerp3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    add3(a, scale3(sub3(b, a), t))
}

#[inline]
pub fn dot4(a: [f64; 4], b: [f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn norm4(a: [f64; 4]) -> f64 {
    dot4(a, a).sqrt()
}

/// Unit vector in the direction of `a`; the zero vector stays zero
pub fn normalize4(a: [f64; 4]) -> [f64; 4] {
    let n = norm4(a);
    if n < 1e-12 {
        return [0.0; 4];
    }
    [a[0] / n, a[1] / n, a[2] / n, a[3] / n]
}
