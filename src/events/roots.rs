//! Bracketed 1-D solvers used to refine pass events.
//!
//! Both take fallible closures so propagation errors abort the search
//! instead of being folded into the numbers.

/// Cap on bisection halvings; 64 halvings take any f64 bracket below 1 ulp.
pub const MAX_BISECTIONS: usize = 64;
/// Cap on golden-section reductions.
pub const MAX_GOLDEN_STEPS: usize = 100;

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Narrows `[lo, hi]` around the point where `predicate` flips from false
/// (at `lo`) to true (at `hi`). Returns the final `(lo, hi)` with
/// `hi - lo <= tolerance`, or after [`MAX_BISECTIONS`] steps.
pub fn bisect<F, E>(
    mut lo: f64,
    mut hi: f64,
    tolerance: f64,
    mut predicate: F,
) -> Result<(f64, f64), E>
where
    F: FnMut(f64) -> Result<bool, E>,
{
    for _ in 0..MAX_BISECTIONS {
        if hi - lo <= tolerance {
            break;
        }
        let mid = lo + (hi - lo) / 2.0;
        if predicate(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok((lo, hi))
}

/// Golden-section search for the maximum of a unimodal `f` on `[a, b]`.
/// Returns `(x, f(x))` for the best point evaluated.
pub fn golden_section_max<F, E>(
    mut a: f64,
    mut b: f64,
    tolerance: f64,
    mut f: F,
) -> Result<(f64, f64), E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut c = b - (b - a) * INV_PHI;
    let mut d = a + (b - a) * INV_PHI;
    let mut fc = f(c)?;
    let mut fd = f(d)?;

    for _ in 0..MAX_GOLDEN_STEPS {
        if b - a <= tolerance {
            break;
        }
        if fc >= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - (b - a) * INV_PHI;
            fc = f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) * INV_PHI;
            fd = f(d)?;
        }
    }

    Ok(if fc >= fd { (c, fc) } else { (d, fd) })
}
