use glam::DVec2;

/// Axis-aligned lon/lat bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: DVec2::new(f64::INFINITY, f64::INFINITY),
        max: DVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    pub fn extend(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline(always)]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }
}

/// A closed lon/lat ring. The closing point may or may not be repeated.
pub type Ring = Vec<DVec2>;

/// Even-odd ray cast against one ring
fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A polygon with one exterior ring and any number of holes
#[derive(Clone, Debug)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
    pub bounds: Bounds,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        let mut bounds = Bounds::EMPTY;
        for &p in &exterior {
            bounds.extend(p);
        }
        Self {
            exterior,
            holes,
            bounds,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.bounds.contains(p)
            && ring_contains(&self.exterior, p)
            && !self.holes.iter().any(|h| ring_contains(h, p))
    }

    /// Exterior followed by holes, for outline drawing
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

/// A named country made of one or more polygons
#[derive(Clone, Debug)]
pub struct Country {
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bounds: Bounds,
}

impl Country {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        let bounds = polygons
            .iter()
            .fold(Bounds::EMPTY, |acc, p| acc.union(&p.bounds));
        Self {
            name: name.into(),
            polygons,
            bounds,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let p = DVec2::new(lon, lat);
        self.bounds.contains(p) && self.polygons.iter().any(|poly| poly.contains(p))
    }
}
