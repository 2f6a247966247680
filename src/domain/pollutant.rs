// Pollutants measured by the monitoring drones
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantKind {
    Pm25,
    Pm10,
    No2,
    So2,
    Co2,
}

impl PollutantKind {
    pub const ALL: [PollutantKind; 5] = [
        PollutantKind::Pm25,
        PollutantKind::Pm10,
        PollutantKind::No2,
        PollutantKind::So2,
        PollutantKind::Co2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PollutantKind::Pm25 => "PM2.5",
            PollutantKind::Pm10 => "PM10",
            PollutantKind::No2 => "NO₂",
            PollutantKind::So2 => "SO₂",
            PollutantKind::Co2 => "CO₂",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            PollutantKind::Co2 => "ppm",
            _ => "µg/m³",
        }
    }

    /// Chart line color
    pub fn color(self) -> &'static str {
        match self {
            PollutantKind::Pm25 => "#00F5FF",
            PollutantKind::Pm10 => "#39FF14",
            PollutantKind::No2 => "#FFB800",
            PollutantKind::So2 => "#FF6B6B",
            PollutantKind::Co2 => "#BF9FFF",
        }
    }
}

impl std::fmt::Display for PollutantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(PollutantKind::Pm25.unit(), "µg/m³");
        assert_eq!(PollutantKind::So2.unit(), "µg/m³");
        assert_eq!(PollutantKind::Co2.unit(), "ppm");
    }

    #[test]
    fn test_wire_names_match_serde() {
        let names: Vec<String> = PollutantKind::ALL
            .iter()
            .map(|kind| serde_json::to_string(kind).unwrap())
            .collect();
        assert_eq!(names, vec!["\"pm25\"", "\"pm10\"", "\"no2\"", "\"so2\"", "\"co2\""]);
    }
}
