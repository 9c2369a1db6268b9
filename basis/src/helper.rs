use libm::erf;
use std::f64::consts::PI;

/// Above this argument the Boys function is seeded from the error function
/// and recursed upward; below it the series is used.
const BOYS_SERIES_LIMIT: f64 = 30.0;
const BOYS_SERIES_MAX_TERMS: usize = 512;

pub fn factorial(n: u32) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// n!! with the conventions 0!! = (-1)!! = 1.
pub fn double_factorial(n: i32) -> f64 {
    let mut acc = 1.0;
    let mut k = n;
    while k > 1 {
        acc *= k as f64;
        k -= 2;
    }
    acc
}

pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// Normalization of the one dimensional gaussian x^l exp(-alpha x^2).
///
/// N^2 = 2^(3l) l! alpha^l sqrt(2 alpha / pi) / (2l)!
pub fn gaussian_norm_1d(alpha: f64, l: u32) -> f64 {
    let numerator = 2.0_f64.powi(3 * l as i32) * factorial(l) * alpha.powi(l as i32);
    let factor = (2.0 * alpha / PI).sqrt();
    (numerator * factor / factorial(2 * l)).sqrt()
}

/// Normalization of a primitive whose whole angular momentum sits on one axis.
/// The product of one dimensional norms, as for x^l exp(-alpha r^2).
pub fn primitive_norm(alpha: f64, l: u32) -> f64 {
    let n0 = gaussian_norm_1d(alpha, 0);
    gaussian_norm_1d(alpha, l) * n0 * n0
}

/// Boys function F_n(x) for a single order.
pub fn boys_function(n: usize, x: f64) -> f64 {
    let mut values = vec![0.0; n + 1];
    boys_values(n, x, &mut values);
    values[n]
}

/// Fill `out[0..=nmax]` with F_0(x) ... F_nmax(x).
///
/// Small arguments use the convergent series for the highest order followed by
/// downward recursion, large ones start from the error function and recurse up.
pub fn boys_values(nmax: usize, x: f64, out: &mut [f64]) {
    let ex = (-x).exp();
    if x > BOYS_SERIES_LIMIT {
        let sx = x.sqrt();
        out[0] = 0.5 * (PI / x).sqrt() * erf(sx);
        for n in 1..=nmax {
            out[n] = ((2 * n - 1) as f64 * out[n - 1] - ex) / (2.0 * x);
        }
        return;
    }

    let n = nmax as f64;
    let mut term = 1.0 / (2.0 * n + 1.0);
    let mut sum = term;
    for k in 1..BOYS_SERIES_MAX_TERMS {
        term *= 2.0 * x / (2.0 * n + 2.0 * k as f64 + 1.0);
        sum += term;
        if term < sum * f64::EPSILON {
            break;
        }
    }
    out[nmax] = ex * sum;
    for m in (0..nmax).rev() {
        out[m] = (2.0 * x * out[m + 1] + ex) / (2 * m + 1) as f64;
    }
}

// Simpson's rule integration
#[cfg(test)]
pub(crate) fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}
