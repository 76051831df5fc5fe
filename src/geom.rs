// geometry checks for generated polygons
//
// a polygon counts as convex when:
// - every turn between consecutive edge vectors bends the same way (cross-product sign)
// - no two non-adjacent edges cross (rules out pentagram-style stars, whose turns all agree)

use crate::dna::Coordinate;

/// z component of the cross product of two 2d vectors
#[inline]
fn cross(a: (i64, i64), b: (i64, i64)) -> i64 {
    a.0 * b.1 - a.1 * b.0
}

/// orientation of r relative to the directed line p->q
#[inline]
fn orient(p: Coordinate, q: Coordinate, r: Coordinate) -> i64 {
    cross(q.sub(p), r.sub(p))
}

/// proper crossing of segments (a, b) and (c, d), touching does not count
fn segments_intersect(a: Coordinate, b: Coordinate, c: Coordinate, d: Coordinate) -> bool {
    let abc = orient(a, b, c).signum();
    let abd = orient(a, b, d).signum();
    let cda = orient(c, d, a).signum();
    let cdb = orient(c, d, b).signum();
    abc * abd < 0 && cda * cdb < 0
}

/// no two non-adjacent edges cross
pub fn is_simple(pts: &[Coordinate]) -> bool {
    let n = pts.len();
    if n < 4 {
        // a triangle (or less) cannot self-intersect
        return true;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        // start k at i+2 to skip adjacent edges
        for k in (i + 2)..n {
            let l = (k + 1) % n;
            // edges sharing a vertex at the wraparound
            if i == l {
                continue;
            }
            if segments_intersect(pts[i], pts[j], pts[k], pts[l]) {
                return false;
            }
        }
    }

    true
}

/// all non-zero turns share one sign. collinear turns are ignored.
pub fn turns_consistent(pts: &[Coordinate]) -> bool {
    let n = pts.len();
    if n < 3 {
        return true;
    }

    let mut sign = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        let k = (j + 1) % n;
        let turn = cross(pts[j].sub(pts[i]), pts[k].sub(pts[j])).signum();
        if turn == 0 {
            continue;
        }
        if sign == 0 {
            sign = turn;
        } else if turn != sign {
            return false;
        }
    }

    true
}

/// convexity test used by the random polygon factory.
/// fewer than three points has nothing to reject and counts as convex.
pub fn is_convex(pts: &[Coordinate]) -> bool {
    turns_consistent(pts) && is_simple(pts)
}
