use tracing::warn;

use crate::blueprint::BlueprintData;

/// Latitude band a blueprint can be placed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub name: &'static str,
    pub abbreviation: char,
    pub height: f64,
    pub width: f64,
}

const fn sector(name: &'static str, abbreviation: char, height: f64, width: f64) -> Sector {
    Sector { name, abbreviation, height, width }
}

/// Smallest first. Heights carry +1 so exact fits count; planetary is the
/// fallback and nothing fits it by accident.
pub static SECTORS: [Sector; 5] = [
    sector("tiny", 't', 10.0, 25.0),
    sector("tertiary", 'C', 26.0, 25.0),
    sector("secondary", 'B', 51.0, 40.0),
    sector("equator", 'A', 81.0, 50.0),
    sector("planetary", 'P', 0.0, 1.0),
];

/// Footprint of the primary area measured against the sectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeAssessment {
    width: u16,
    height: u16,
}

impl SizeAssessment {
    /// `None` for a blueprint with no areas
    pub fn new(data: &BlueprintData) -> Option<Self> {
        let areas = data.areas();
        if areas.len() > 1 {
            warn!("Multi-area blueprint with {} areas, sizing the first only", areas.len());
        }
        areas.first().map(|area| Self { width: area.width, height: area.height })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Smallest sector the height fits in
    pub fn sector(&self) -> &'static Sector {
        let height = f64::from(self.height);
        SECTORS
            .iter()
            .find(|s| height <= s.height)
            .unwrap_or(&SECTORS[SECTORS.len() - 1])
    }

    pub fn height_scale(&self) -> char {
        self.sector().abbreviation
    }

    /// Number of sectors of the chosen band the width spans
    pub fn sector_widths(&self) -> u32 {
        (f64::from(self.width) / self.sector().width).ceil() as u32
    }
}

impl std::fmt::Display for SizeAssessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let height = f64::from(self.height);
        let width = f64::from(self.width);
        let mut fits = Vec::new();
        for sector in SECTORS.iter().filter(|s| height <= s.height) {
            let wide = (width / sector.width).ceil();
            let multiple = if height > 0.0 { (sector.height / height).floor() } else { 1.0 };
            if multiple > 1.0 {
                fits.push(format!("{} {} wide ({}x)", sector.name, wide, multiple));
            } else {
                fits.push(format!("{} {} wide", sector.name, wide));
            }
        }
        if fits.is_empty() {
            fits.push(SECTORS[SECTORS.len() - 1].name.to_string());
        }
        write!(f, "placement: {}  -- ({}x{})", fits.join(", "), self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u16, height: u16) -> SizeAssessment {
        SizeAssessment { width, height }
    }

    #[test]
    fn test_sector_choice() {
        assert_eq!(size(20, 10).height_scale(), 't');
        assert_eq!(size(20, 11).height_scale(), 'C');
        assert_eq!(size(20, 26).height_scale(), 'C');
        assert_eq!(size(20, 51).height_scale(), 'B');
        assert_eq!(size(20, 81).height_scale(), 'A');
        assert_eq!(size(20, 82).height_scale(), 'P');
    }

    #[test]
    fn test_sector_widths() {
        assert_eq!(size(60, 20).sector_widths(), 3);
        assert_eq!(size(80, 40).sector_widths(), 2);
        assert_eq!(size(7, 200).sector_widths(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            size(60, 20).to_string(),
            "placement: tertiary 3 wide, secondary 2 wide (2x), equator 2 wide (4x)  -- (60x20)"
        );
        assert_eq!(size(10, 100).to_string(), "placement: planetary  -- (10x100)");
    }
}
