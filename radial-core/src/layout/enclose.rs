// Smallest enclosing circle of a set of circles.
//
// Welzl-style incremental algorithm: walk a shuffled copy of the input and,
// whenever a circle falls outside the current candidate, rebuild the support
// basis (at most three circles) so it includes that circle. The shuffle uses a
// fixed LCG so results are reproducible.

use super::geometry::Circle;

/// Returns `None` only for an empty input.
pub fn enclose(circles: &[Circle]) -> Option<Circle> {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled, &mut Lcg::default());

    let n = shuffled.len();
    // Restarts are bounded in practice; the cap only guards against float
    // cycles on pathological input.
    let max_restarts = 4 * n * n + 16;
    let mut restarts = 0;

    let mut basis: Vec<Circle> = Vec::new();
    let mut enclosing: Option<Circle> = None;
    let mut i = 0;
    while i < n {
        let p = shuffled[i];
        match enclosing {
            Some(e) if encloses_weak(&e, &p) => i += 1,
            _ => {
                restarts += 1;
                match extend_basis(&basis, p) {
                    Some(b) if restarts <= max_restarts => {
                        enclosing = Some(enclose_basis(&b));
                        basis = b;
                        i = 0;
                    }
                    _ => return Some(enclose_naive(circles)),
                }
            }
        }
    }
    enclosing
}

/// Loose but always-valid enclosure, centered on the bounding box.
fn enclose_naive(circles: &[Circle]) -> Circle {
    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for c in circles {
        x0 = x0.min(c.x - c.r);
        y0 = y0.min(c.y - c.r);
        x1 = x1.max(c.x + c.r);
        y1 = y1.max(c.y + c.r);
    }
    let center = Circle::new((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0.0);
    let r = circles
        .iter()
        .map(|c| center.center_distance(c) + c.r)
        .fold(0.0, f64::max);
    Circle { r, ..center }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(&p, basis) {
        return Some(vec![p]);
    }

    for &b in basis {
        if encloses_not(&p, &b) && encloses_weak_all(&enclose_basis2(&b, &p), basis) {
            return Some(vec![b, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(&enclose_basis2(&bi, &bj), &p)
                && encloses_not(&enclose_basis2(&bi, &p), &bj)
                && encloses_not(&enclose_basis2(&bj, &p), &bi)
                && encloses_weak_all(&enclose_basis3(&bi, &bj, &p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => enclose_naive(basis),
    }
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
    let (x21, y21, r21) = (b.x - a.x, b.y - a.y, b.r - a.r);
    let l = x21.hypot(y21);
    if l == 0.0 {
        return if a.r >= b.r { *a } else { *b };
    }
    Circle::new(
        (a.x + b.x + x21 / l * r21) / 2.0,
        (a.y + b.y + y21 / l * r21) / 2.0,
        (l + a.r + b.r) / 2.0,
    )
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}

/// Deterministic linear congruential generator (Numerical Recipes constants).
struct Lcg(u64);

impl Default for Lcg {
    fn default() -> Self {
        Self(1)
    }
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    fn next_f64(&mut self) -> f64 {
        self.0 = (Self::A * self.0 + Self::C) % Self::M;
        self.0 as f64 / Self::M as f64
    }
}

fn shuffle(items: &mut [Circle], rng: &mut Lcg) {
    let mut m = items.len();
    while m > 0 {
        let i = (rng.next_f64() * m as f64) as usize;
        m -= 1;
        items.swap(m, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_empty() {
        assert_eq!(enclose(&[]), None);
    }

    #[test]
    fn test_single_circle() {
        let c = Circle::new(3.0, -2.0, 5.0);
        assert_eq!(enclose(&[c]), Some(c));
    }

    #[test]
    fn test_two_circles_side_by_side() {
        let e = enclose(&[Circle::new(-2.0, 0.0, 1.0), Circle::new(2.0, 0.0, 1.0)]).unwrap();
        assert!(close(e.x, 0.0) && close(e.y, 0.0) && close(e.r, 3.0));
    }

    #[test]
    fn test_nested_circle_is_absorbed() {
        let e = enclose(&[Circle::new(0.0, 0.0, 10.0), Circle::new(1.0, 1.0, 2.0)]).unwrap();
        assert!(close(e.r, 10.0));
    }

    #[test]
    fn test_three_unit_circles_in_triangle() {
        // Centers on a circle of radius 2: enclosing radius is 3.
        let circles: Vec<Circle> = (0..3)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 3.0;
                Circle::new(2.0 * a.cos(), 2.0 * a.sin(), 1.0)
            })
            .collect();
        let e = enclose(&circles).unwrap();
        assert!(close(e.x, 0.0) && close(e.y, 0.0) && close(e.r, 3.0), "{e:?}");
    }

    #[test]
    fn test_encloses_every_input() {
        let circles: Vec<Circle> = (0..40)
            .map(|i| {
                let t = i as f64;
                Circle::new((t * 1.7).sin() * 20.0, (t * 0.9).cos() * 15.0, 1.0 + (t % 5.0))
            })
            .collect();
        let e = enclose(&circles).unwrap();
        for c in &circles {
            assert!(e.contains(c, 1e-6), "{c:?} not in {e:?}");
        }
        let naive = enclose_naive(&circles);
        assert!(e.r <= naive.r + 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let circles: Vec<Circle> = (0..12)
            .map(|i| Circle::new(i as f64, (i * i) as f64 % 7.0, 1.5))
            .collect();
        assert_eq!(enclose(&circles), enclose(&circles));
    }
}
