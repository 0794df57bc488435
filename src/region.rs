//! Rectangular regions of the complex plane.
//!
//! A region is the rectangle `[x0, x1] x [y0, y1]` an image is mapped onto.
//! At zoom factor 1 it is 6.3 wide and 4.2 high, which frames the whole set
//! with a 3:2 aspect ratio. A handful of named regions point at well-known
//! spots.

/// Width of a region at zoom factor 1.
pub const DEFAULT_REGION_WIDTH: f64 = 6.3;

/// Height of a region at zoom factor 1.
pub const DEFAULT_REGION_HEIGHT: f64 = 4.2;

/// A rectangle in the complex plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MandelbrotRegion {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Centre and zoom factor of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterAndZoom {
    pub x: f64,
    pub y: f64,
    pub zoom_factor: f64,
}

impl MandelbrotRegion {
    /// Region of the default size divided by `zoom_factor`, centred on `x + yi`.
    pub fn from_center(x: f64, y: f64, zoom_factor: f64) -> Self {
        MandelbrotRegion {
            x0: x - 0.5 * DEFAULT_REGION_WIDTH / zoom_factor,
            y0: y - 0.5 * DEFAULT_REGION_HEIGHT / zoom_factor,
            x1: x + 0.5 * DEFAULT_REGION_WIDTH / zoom_factor,
            y1: y + 0.5 * DEFAULT_REGION_HEIGHT / zoom_factor,
        }
    }

    /// Inverse of [`MandelbrotRegion::from_center`]; a zero-width region has zoom 1.
    pub fn center_and_zoom(&self) -> CenterAndZoom {
        let width = (self.x1 - self.x0).abs();

        CenterAndZoom {
            x: 0.5 * (self.x0 + self.x1),
            y: 0.5 * (self.y0 + self.y1),
            zoom_factor: if width != 0.0 {
                DEFAULT_REGION_WIDTH / width
            } else {
                1.0
            },
        }
    }

    /// Per-pixel step when the region is sampled on a `width x height` grid.
    pub fn delta_for(&self, width: usize, height: usize) -> (f64, f64) {
        (
            (self.x1 - self.x0) / width as f64,
            (self.y1 - self.y0) / height as f64,
        )
    }

    /// Looks up a named region.
    pub fn named(name: &str) -> Option<MandelbrotRegion> {
        NAMED_REGIONS
            .iter()
            .find(|(region_name, ..)| *region_name == name)
            .map(|&(_, x, y, zoom_factor)| MandelbrotRegion::from_center(x, y, zoom_factor))
    }

    /// Looks up a named region, falling back to the default one for unknown
    /// or missing names.
    pub fn named_or_default(name: Option<&str>) -> MandelbrotRegion {
        name.and_then(MandelbrotRegion::named).unwrap_or_default()
    }

    /// Names accepted by [`MandelbrotRegion::named`], in display order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMED_REGIONS.iter().map(|(name, ..)| *name)
    }
}

impl Default for MandelbrotRegion {
    fn default() -> Self {
        MandelbrotRegion::from_center(0.0, 0.0, 1.0)
    }
}

// name, centre x, centre y, zoom factor
const NAMED_REGIONS: [(&str, f64, f64, f64); 9] = [
    ("Default", 0.0, 0.0, 1.0),
    ("Flower", -1.999985881160, 0.0, 683173100.0),
    ("Julia Island", -1.76877883, -0.001738898, 5498200.0),
    ("Starfish", -0.374004139, 0.659792175, 1600.0),
    ("Sun", -0.776592847, -0.136640848, 194250.0),
    ("Tendrils", -0.22626663, 1.11617444, 2302800.0),
    ("Tree", -1.940157353, -0.0000011, 2054780.0),
    ("Outside", -2.85, 2.1, DEFAULT_REGION_HEIGHT * 5.0),
    ("Black", 0.0, 0.0, DEFAULT_REGION_HEIGHT * 5.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_default_region() {
        let region = MandelbrotRegion::default();
        assert_eq!(region.x0, -3.15);
        assert_eq!(region.x1, 3.15);
        assert_eq!(region.y0, -2.1);
        assert_eq!(region.y1, 2.1);
    }

    #[test]
    fn test_center_and_zoom_round_trip() {
        let region = MandelbrotRegion::from_center(-0.75, 0.1, 250.0);
        let center = region.center_and_zoom();
        assert_close(center.x, -0.75);
        assert_close(center.y, 0.1);
        assert_close(center.zoom_factor, 250.0);
    }

    #[test]
    fn test_zero_width_has_unit_zoom() {
        let region = MandelbrotRegion {
            x0: 1.0,
            y0: 0.0,
            x1: 1.0,
            y1: 1.0,
        };
        assert_eq!(region.center_and_zoom().zoom_factor, 1.0);
    }

    #[test]
    fn test_delta_for() {
        let (dx, dy) = MandelbrotRegion::default().delta_for(630, 420);
        assert_close(dx, 0.01);
        assert_close(dy, 0.01);
    }

    #[test]
    fn test_named_regions() {
        assert_eq!(MandelbrotRegion::names().count(), 9);
        assert_eq!(
            MandelbrotRegion::named("Default"),
            Some(MandelbrotRegion::default())
        );

        let starfish = MandelbrotRegion::named("Starfish").map(|r| r.center_and_zoom());
        assert!(starfish.is_some_and(|c| (c.zoom_factor - 1600.0).abs() < 1e-6));

        assert_eq!(MandelbrotRegion::named("Nowhere"), None);
        assert_eq!(
            MandelbrotRegion::named_or_default(Some("Nowhere")),
            MandelbrotRegion::default()
        );
        assert_eq!(
            MandelbrotRegion::named_or_default(None),
            MandelbrotRegion::default()
        );
    }
}
