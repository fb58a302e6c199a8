//! Standard district heating pipe dimensions and loss estimates.

/// One row of the pipe catalog (insulation class 3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    /// Nominal size.
    pub dn: u32,
    /// Inner diameter, m.
    pub inner_diameter: f64,
    /// Insulation thickness, m.
    pub insulation_thickness: f64,
}

const fn entry(dn: u32, inner_mm: f64, jacket_mm: f64, outer_mm: f64) -> CatalogEntry {
    CatalogEntry {
        dn,
        inner_diameter: inner_mm * 1e-3,
        insulation_thickness: (jacket_mm - outer_mm) / 2.0 * 1e-3,
    }
}

/// Steel medium pipe inner diameter, jacket and steel outer diameter, mm.
pub const CATALOG: [CatalogEntry; 22] = [
    entry(20, 21.6, 125.0, 26.9),
    entry(25, 28.5, 125.0, 33.7),
    entry(32, 37.2, 140.0, 42.4),
    entry(40, 43.1, 140.0, 48.3),
    entry(50, 54.5, 160.0, 60.3),
    entry(65, 70.3, 180.0, 76.1),
    entry(80, 82.5, 200.0, 88.9),
    entry(100, 107.1, 250.0, 114.3),
    entry(125, 132.5, 280.0, 139.7),
    entry(150, 160.3, 315.0, 168.3),
    entry(200, 210.1, 400.0, 219.1),
    entry(250, 263.0, 500.0, 273.0),
    entry(300, 312.7, 580.0, 323.9),
    entry(350, 344.4, 630.0, 355.6),
    entry(400, 393.8, 730.0, 406.4),
    entry(450, 444.6, 800.0, 457.2),
    entry(500, 495.4, 900.0, 508.0),
    entry(600, 595.8, 1000.0, 610.0),
    entry(700, 695.0, 1100.0, 711.0),
    entry(800, 795.4, 1200.0, 813.0),
    entry(900, 894.0, 1300.0, 914.0),
    entry(1000, 994.0, 1400.0, 1016.0),
];

/// Catalog entry whose inner diameter is closest to `inner_diameter` (m).
/// Ties go to the smaller size.
pub fn snap_to_catalog(inner_diameter: f64) -> CatalogEntry {
    let mut best = CATALOG[0];
    for e in CATALOG.iter().skip(1) {
        if (e.inner_diameter - inner_diameter).abs() < (best.inner_diameter - inner_diameter).abs()
        {
            best = *e;
        }
    }
    best
}

const XI_ELBOW: f64 = 0.08;
const XI_TEE: f64 = 0.25;
const XI_VALVE: f64 = 0.05;

/// Minor loss coefficient of a buried pipe of `length` meters: one U-bend of
/// four elbows every 25 m, a tee at each end shared by three pipes, and two
/// slide valves.
pub fn estimate_minor_loss(length: f64) -> f64 {
    4.0 * (length / 25.0).floor() * XI_ELBOW + 2.0 / 3.0 * 2.0 * XI_TEE + 2.0 * XI_VALVE
}
