//! # Easing Library
//!
//! Progress-remapping curves for animation timing.
//!
//! ## Responsibilities
//! - **Named Curves**: closed-form quadratic in/out/in-out and bounce.
//! - **Cubic Bezier**: CSS-style timing functions solved numerically.
//!
//! ## Key Types
//! - `Easing`: the closed set of curves a tween can reference.
//! - `CubicBezier`: a parametric curve with endpoints pinned at (0,0)/(1,1).

use keyframe::EasingFunction;

const SOLVE_EPSILON: f64 = 1e-6;
const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 48;

/// A CSS-style cubic-bezier timing function.
///
/// The first and last control points are fixed at (0,0) and (1,1); the two
/// inner points shape the curve. Polynomial coefficients are precomputed so
/// evaluation allocates nothing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CubicBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl CubicBezier {
    pub fn new(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        let cx = 3.0 * p1x;
        let bx = 3.0 * (p2x - p1x) - cx;
        let ax = 1.0 - cx - bx;

        let cy = 3.0 * p1y;
        let by = 3.0 * (p2y - p1y) - cy;
        let ay = 1.0 - cy - by;

        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    fn sample_x(&self, u: f64) -> f64 {
        ((self.ax * u + self.bx) * u + self.cx) * u
    }

    fn sample_y(&self, u: f64) -> f64 {
        ((self.ay * u + self.by) * u + self.cy) * u
    }

    fn sample_derivative_x(&self, u: f64) -> f64 {
        (3.0 * self.ax * u + 2.0 * self.bx) * u + self.cx
    }

    /// Solves `x(u) = x` for the parametric variable `u`.
    ///
    /// Newton-Raphson converges in a handful of steps for well-behaved
    /// control points but diverges where the derivative flattens out;
    /// bounded bisection over `[0, 1]` picks up those cases and always
    /// terminates.
    fn solve_x(&self, x: f64) -> f64 {
        // First try a few iterations of Newton's method -- normally very fast.
        let mut u = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = self.sample_x(u) - x;
            if err.abs() < SOLVE_EPSILON {
                return u;
            }
            let derivative = self.sample_derivative_x(u);
            if derivative.abs() < SOLVE_EPSILON {
                break;
            }
            u -= err / derivative;
        }

        // Fall back to bisection for reliability.
        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        u = x;

        if u < lo {
            return lo;
        }
        if u > hi {
            return hi;
        }

        for _ in 0..BISECTION_ITERATIONS {
            let sampled = self.sample_x(u);
            if (sampled - x).abs() < SOLVE_EPSILON {
                return u;
            }
            if x > sampled {
                lo = u;
            } else {
                hi = u;
            }
            u = (hi - lo) * 0.5 + lo;
        }

        u
    }

    /// Maps progress `t` in [0,1] through the curve.
    pub fn evaluate(&self, t: f64) -> f64 {
        self.sample_y(self.solve_x(t))
    }
}

/// The closed set of curves the engine ships.
///
/// Named variants are closed-form polynomials; `Bezier` covers everything
/// else. Output stays in [0,1] for the named quadratics; `BounceOut` and
/// steep bezier control points may overshoot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Easing {
    Linear,
    In,
    Out,
    InOut,
    BounceOut,
    Bezier(CubicBezier),
}

impl Easing {
    /// CSS-style shorthand for a bezier curve.
    pub fn bezier(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        Easing::Bezier(CubicBezier::new(p1x, p1y, p2x, p2y))
    }

    pub fn eval(&self, x: f32) -> f32 {
        self.y(x as f64) as f32
    }
}

impl EasingFunction for Easing {
    fn y(&self, x: f64) -> f64 {
        match self {
            Easing::Linear => keyframe::functions::Linear.y(x),
            Easing::In => x * x,
            Easing::Out => x * (2.0 - x),
            Easing::InOut => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
                }
            }
            Easing::BounceOut => bounce_out(x),
            Easing::Bezier(curve) => curve.evaluate(x),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}
