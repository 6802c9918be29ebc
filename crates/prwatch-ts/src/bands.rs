/// Daily irradiation class used to color PR points.
///
/// Bounds are half-open: `[2, 4)` and `[4, 6)`; anything at or above 6
/// kWh/m2 is the top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhiBand {
    Below2,
    From2To4,
    From4To6,
    Above6,
    Missing,
}

impl GhiBand {
    pub const ALL: [GhiBand; 5] = [
        GhiBand::Below2,
        GhiBand::From2To4,
        GhiBand::From4To6,
        GhiBand::Above6,
        GhiBand::Missing,
    ];

    pub fn classify(ghi: Option<f64>) -> Self {
        match ghi {
            None => GhiBand::Missing,
            Some(v) if v.is_nan() => GhiBand::Missing,
            Some(v) if v < 2.0 => GhiBand::Below2,
            Some(v) if v < 4.0 => GhiBand::From2To4,
            Some(v) if v < 6.0 => GhiBand::From4To6,
            Some(_) => GhiBand::Above6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GhiBand::Below2 => "<2",
            GhiBand::From2To4 => "2-4",
            GhiBand::From4To6 => "4-6",
            GhiBand::Above6 => ">6",
            GhiBand::Missing => "missing",
        }
    }
}
