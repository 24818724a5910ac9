use vexillo_engine::coords::{Bounds, Rgb};
use vexillo_engine::drawable::Emblem;
use vexillo_engine::geometry::{band_rectangles, Axis, MeshBuilder};

/// Equal bands filling a box, one per color.
///
/// With a tessellation set, each band becomes a grid of shared-vertex cells
/// so the wave bends it smoothly instead of only moving its corners.
#[derive(Debug, Clone)]
pub struct StripeFlag {
    name: String,
    description: String,
    bounds: Bounds,
    axis: Axis,
    colors: Vec<Rgb>,
    tessellation: Option<(u32, u32)>,
}

impl StripeFlag {
    pub fn new(name: impl Into<String>, bounds: Bounds, axis: Axis, colors: &[Rgb]) -> Self {
        let name = name.into();
        Self {
            description: format!("Showing flag: {name}"),
            name,
            bounds,
            axis,
            colors: colors.to_vec(),
            tessellation: None,
        }
    }

    /// Splits every band into `cols` x `rows` cells.
    pub fn tessellated(mut self, cols: u32, rows: u32) -> Self {
        self.tessellation = Some((cols, rows));
        self
    }
}

impl Emblem for StripeFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        match self.tessellation {
            None => {
                mesh.add_bands(self.bounds, self.axis, &self.colors);
            }
            Some((cols, rows)) => {
                for band in band_rectangles(self.bounds, self.axis, &self.colors) {
                    mesh.add_tessellated_rectangle(&band, cols, rows);
                }
            }
        }
    }
}

/// Box shared by the tricolors.
const TRICOLOR: Bounds = Bounds::centered(0.8, 0.75);

pub fn gabon() -> StripeFlag {
    StripeFlag::new(
        "Gabon",
        TRICOLOR,
        Axis::Horizontal,
        &[Rgb::new(0.0, 0.6, 0.3), Rgb::new(1.0, 0.8, 0.0), Rgb::new(0.0, 0.3, 0.7)],
    )
}

pub fn germany() -> StripeFlag {
    StripeFlag::new(
        "Germany",
        TRICOLOR,
        Axis::Horizontal,
        &[Rgb::black(), Rgb::new(0.8, 0.0, 0.0), Rgb::new(1.0, 0.8, 0.0)],
    )
}

pub fn austria() -> StripeFlag {
    let red = Rgb::new(0.85, 0.0, 0.0);
    StripeFlag::new("Austria", TRICOLOR, Axis::Horizontal, &[red, Rgb::white(), red])
}

pub fn romania() -> StripeFlag {
    StripeFlag::new(
        "Romania",
        TRICOLOR,
        Axis::Vertical,
        &[Rgb::new(0.0, 0.0, 0.6), Rgb::new(1.0, 0.8, 0.0), Rgb::new(0.8, 0.0, 0.0)],
    )
}

/// Vertical tricolor, tessellated so the wave ripples through each band.
pub fn france() -> StripeFlag {
    StripeFlag::new(
        "France",
        TRICOLOR,
        Axis::Vertical,
        &[Rgb::new(0.0, 0.0, 0.6), Rgb::white(), Rgb::new(0.8, 0.0, 0.0)],
    )
    .tessellated(8, 12)
}
