//! Precession from the J2000 mean equator/equinox to the mean of date.
//!
//! Capitaine et al. (2003) four-angle formulation. Nutation is not
//! applied; its sub-arcminute effect is below what pass timing needs.

use nalgebra::Matrix3;

use crate::time::{Epoch, SECONDS_PER_DAY};

const ASEC2RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);
/// Mean obliquity at J2000.0, arcseconds.
const EPS0: f64 = 84381.406;
/// TT - UTC since 2017 (37 leap seconds + 32.184 s).
const TT_MINUS_UTC_S: f64 = 69.184;
const J2000_JULIAN_DATE: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Rotation taking EME2000 vectors to the mean equator and equinox of `epoch`.
pub fn precession_matrix(epoch: Epoch) -> Matrix3<f64> {
    let jd_tt = epoch.julian_date() + TT_MINUS_UTC_S / SECONDS_PER_DAY;
    let t = (jd_tt - J2000_JULIAN_DATE) / DAYS_PER_JULIAN_CENTURY;

    let psi_a = ((((-0.0000000951 * t + 0.000132851) * t - 0.00114045) * t - 1.0790069) * t
        + 5038.481507)
        * t;
    let omega_a =
        ((((0.0000003337 * t - 0.000000467) * t - 0.00772503) * t + 0.0512623) * t - 0.025754) * t
            + EPS0;
    let chi_a = ((((-0.0000000560 * t + 0.000170663) * t - 0.00121197) * t - 2.3814292) * t
        + 10.556403)
        * t;

    let (sa, ca) = (EPS0 * ASEC2RAD).sin_cos();
    let (sb, cb) = (-psi_a * ASEC2RAD).sin_cos();
    let (sc, cc) = (-omega_a * ASEC2RAD).sin_cos();
    let (sd, cd) = (chi_a * ASEC2RAD).sin_cos();

    // R3(chi_a) * R1(-omega_a) * R3(-psi_a) * R1(eps_0)
    #[rustfmt::skip]
    let m = Matrix3::new(
        cd * cb - sb * sd * cc,
        cd * sb * ca + sd * cc * cb * ca - sa * sd * sc,
        cd * sb * sa + sd * cc * cb * sa + ca * sd * sc,

        -sd * cb - sb * cd * cc,
        -sd * sb * ca + cd * cc * cb * ca - sa * cd * sc,
        -sd * sb * sa + cd * cc * cb * sa + ca * cd * sc,

        sb * sc,
        -sc * cb * ca - sa * cc,
        -sc * cb * sa + cc * ca,
    );
    m
}
