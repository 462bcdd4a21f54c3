//! Region quadtree for nearest-airport lookup
//!
//! The tree splits a lat/lon bounding box into four quadrants around its
//! midpoint until both spans drop below [`MIN_GRID_SIZE`]. Each leaf cell holds
//! at most one item.
//!
//! `nearest` is an approximate query: it returns whatever item shares the
//! query's leaf cell, not the geometrically closest item. An airport in the
//! neighbouring cell is never considered. Airports are sparse compared to the
//! cell size, and the flat O(depth) lookup keeps results reproducible.

use crate::geometry::GeoPoint;

/// Leaf cell size in degrees (both latitude and longitude span)
pub const MIN_GRID_SIZE: f64 = 0.09;

/// Anything with a fixed position that can be stored in the tree
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

/// Bounding box of a tree node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl CellBounds {
    /// The world box used by default. Latitude spans [-180, 180] as well; the
    /// leaf grid depends on it.
    pub const WORLD: CellBounds = CellBounds {
        lat_min: -180.0,
        lat_max: 180.0,
        lon_min: -180.0,
        lon_max: 180.0,
    };

    fn lat_mid(&self) -> f64 {
        (self.lat_min + self.lat_max) / 2.0
    }

    fn lon_mid(&self) -> f64 {
        (self.lon_min + self.lon_max) / 2.0
    }

    fn is_leaf(&self) -> bool {
        (self.lat_max - self.lat_min).abs() < MIN_GRID_SIZE
            && (self.lon_max - self.lon_min).abs() < MIN_GRID_SIZE
    }

    /// Quadrant containing the point and that quadrant's bounds.
    /// Points on a midpoint line belong to the north/east side.
    fn quadrant(&self, lat: f64, lon: f64) -> (Quadrant, CellBounds) {
        let (lat_mid, lon_mid) = (self.lat_mid(), self.lon_mid());
        let south = lat < lat_mid;
        let west = lon < lon_mid;

        let (lat_min, lat_max) = if south {
            (self.lat_min, lat_mid)
        } else {
            (lat_mid, self.lat_max)
        };
        let (lon_min, lon_max) = if west {
            (self.lon_min, lon_mid)
        } else {
            (lon_mid, self.lon_max)
        };

        let quadrant = match (south, west) {
            (false, true) => Quadrant::NorthWest,
            (false, false) => Quadrant::NorthEast,
            (true, true) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        };

        (
            quadrant,
            CellBounds {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            },
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat < self.lat_max && lon >= self.lon_min && lon < self.lon_max
    }
}

/// Region quadtree node. Children are created lazily on first insert.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    bounds: CellBounds,
    is_leaf: bool,
    children: [Option<Box<QuadTree<T>>>; 4],
    item: Option<T>,
}

impl<T: Located> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Located> QuadTree<T> {
    /// Empty tree over the world box
    pub fn new() -> Self {
        Self::with_bounds(CellBounds::WORLD)
    }

    pub fn with_bounds(bounds: CellBounds) -> Self {
        Self {
            bounds,
            is_leaf: bounds.is_leaf(),
            children: [None, None, None, None],
            item: None,
        }
    }

    pub fn bounds(&self) -> CellBounds {
        self.bounds
    }

    /// Store `item` in the leaf cell containing its location
    ///
    /// A leaf keeps only the last item inserted into it: the previous occupant,
    /// if any, is handed back so the caller can report the collision.
    pub fn insert(&mut self, item: T) -> Option<T> {
        let location = item.location();
        let mut node = self;

        while !node.is_leaf {
            let (quadrant, bounds) = node.bounds.quadrant(location.lat, location.lon);
            node = &mut **node.children[quadrant as usize]
                .get_or_insert_with(|| Box::new(QuadTree::with_bounds(bounds)));
        }

        node.item.replace(item)
    }

    /// Item sharing the query's leaf cell, or `None` if that cell (or any
    /// quadrant on the way down) was never populated
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&T> {
        let mut node = self;

        while !node.is_leaf {
            let (quadrant, _) = node.bounds.quadrant(lat, lon);
            node = node.children[quadrant as usize].as_deref()?;
        }

        node.item.as_ref()
    }

    /// Bounds of the leaf cell a query at `lat`/`lon` descends to, whether or
    /// not that cell exists yet
    pub fn leaf_cell(&self, lat: f64, lon: f64) -> CellBounds {
        let mut bounds = self.bounds;
        while !bounds.is_leaf() {
            bounds = bounds.quadrant(lat, lon).1;
        }
        bounds
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.item.is_some() as usize
            + self
                .children
                .iter()
                .flatten()
                .map(|child| child.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of the deepest created node (a lone root has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// All stored items, depth first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut items = Vec::new();
        self.collect_items(&mut items);
        items.into_iter()
    }

    fn collect_items<'a>(&'a self, items: &mut Vec<&'a T>) {
        if let Some(item) = &self.item {
            items.push(item);
        }
        for child in self.children.iter().flatten() {
            child.collect_items(items);
        }
    }

    /// Visit every leaf that was created, with its bounds and occupant
    pub fn for_each_leaf(&self, f: &mut impl FnMut(CellBounds, Option<&T>)) {
        if self.is_leaf {
            f(self.bounds, self.item.as_ref());
            return;
        }
        for child in self.children.iter().flatten() {
            child.for_each_leaf(f);
        }
    }
}
