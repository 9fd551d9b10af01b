//! Labels shared by the rate tables, the grant calculation and the farm plan.
//!
//! Each label has one canonical spelling (used for output) and accepts a few
//! legacy spellings on input. Serde goes through the same `FromStr` impls so
//! files, query strings and CLI flags agree on what is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum CropType {
    FreshFruit,
    Olival,
    FrutosSecos,
    Vinha,
}

impl CropType {
    pub const ALL: [CropType; 4] = [
        CropType::FreshFruit,
        CropType::Olival,
        CropType::FrutosSecos,
        CropType::Vinha,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CropType::FreshFruit => "fresh-fruit",
            CropType::Olival => "olival",
            CropType::FrutosSecos => "frutos-secos",
            CropType::Vinha => "vinha",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CropType::FreshFruit => "Fresh Fruit",
            CropType::Olival => "Olival",
            CropType::FrutosSecos => "Frutos Secos",
            CropType::Vinha => "Vinha",
        }
    }
}

impl FromStr for CropType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "fresh-fruit" | "freshFruit" | "fresh_fruit" => Ok(CropType::FreshFruit),
            "olival" => Ok(CropType::Olival),
            "frutos-secos" | "frutosSecos" | "frutos_secos" => Ok(CropType::FrutosSecos),
            "vinha" => Ok(CropType::Vinha),
            other => Err(Error::UnknownCrop(other.to_string())),
        }
    }
}

/// Subsidy track. The two bio variants are the conversion and maintenance
/// phases of the same program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ProgramType {
    BioConversion,
    BioMaintenance,
    Prodi,
}

impl ProgramType {
    pub const ALL: [ProgramType; 3] = [
        ProgramType::BioConversion,
        ProgramType::BioMaintenance,
        ProgramType::Prodi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProgramType::BioConversion => "bio-conversion",
            ProgramType::BioMaintenance => "bio-maintenance",
            ProgramType::Prodi => "prodi",
        }
    }

    /// Column of the modifier tables used by this program. PRODI has no
    /// maintenance phase and always reads the conversion column.
    pub fn mode(self) -> ProgramMode {
        match self {
            ProgramType::BioConversion | ProgramType::Prodi => ProgramMode::Conversion,
            ProgramType::BioMaintenance => ProgramMode::Maintenance,
        }
    }
}

impl FromStr for ProgramType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bio-conversion" | "bioConversion" | "bio_conversion" => Ok(ProgramType::BioConversion),
            "bio-maintenance" | "bioMaintenance" | "bio_maintenance" => {
                Ok(ProgramType::BioMaintenance)
            }
            "prodi" | "prodis" | "PRODI" | "PRODIS" => Ok(ProgramType::Prodi),
            other => Err(Error::UnknownProgram(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramMode {
    Conversion,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum WateringMethod {
    Irrigation,
    #[default]
    RainFed,
}

impl WateringMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            WateringMethod::Irrigation => "irrigation",
            WateringMethod::RainFed => "rain-fed",
        }
    }
}

impl FromStr for WateringMethod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "irrigation" | "irrigated" => Ok(WateringMethod::Irrigation),
            "rain-fed" | "rainfed" | "rain_fed" | "rain" => Ok(WateringMethod::RainFed),
            other => Err(Error::UnknownWateringMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum WaterEfficiencyClass {
    A,
    BPlus,
    B,
    #[default]
    None,
}

impl WaterEfficiencyClass {
    pub const ALL: [WaterEfficiencyClass; 4] = [
        WaterEfficiencyClass::A,
        WaterEfficiencyClass::BPlus,
        WaterEfficiencyClass::B,
        WaterEfficiencyClass::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WaterEfficiencyClass::A => "Class A",
            WaterEfficiencyClass::BPlus => "Class B+",
            WaterEfficiencyClass::B => "Class B",
            WaterEfficiencyClass::None => "None",
        }
    }
}

impl FromStr for WaterEfficiencyClass {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Class A" | "class-a" | "A" | "a" => Ok(WaterEfficiencyClass::A),
            "Class B+" | "class-b+" | "class-b-plus" | "B+" | "b+" => Ok(WaterEfficiencyClass::BPlus),
            "Class B" | "class-b" | "B" | "b" => Ok(WaterEfficiencyClass::B),
            "None" | "none" | "" => Ok(WaterEfficiencyClass::None),
            other => Err(Error::UnknownWaterEfficiencyClass(other.to_string())),
        }
    }
}

macro_rules! label_conversions {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl TryFrom<String> for $ty {
                type Error = Error;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl From<$ty> for &'static str {
                fn from(value: $ty) -> Self {
                    value.as_str()
                }
            }
        )+
    };
}

label_conversions!(CropType, ProgramType, WateringMethod, WaterEfficiencyClass);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_canonical_and_legacy_spellings() {
        assert_eq!("fresh-fruit".parse::<CropType>().unwrap(), CropType::FreshFruit);
        assert_eq!("frutosSecos".parse::<CropType>().unwrap(), CropType::FrutosSecos);
        assert_eq!(
            "bioConversion".parse::<ProgramType>().unwrap(),
            ProgramType::BioConversion
        );
        assert_eq!("prodis".parse::<ProgramType>().unwrap(), ProgramType::Prodi);
        assert_eq!("rain".parse::<WateringMethod>().unwrap(), WateringMethod::RainFed);
        assert_eq!(
            "Class B+".parse::<WaterEfficiencyClass>().unwrap(),
            WaterEfficiencyClass::BPlus
        );
    }

    #[test]
    fn unknown_labels_are_reported() {
        assert_eq!(
            "kiwi".parse::<CropType>(),
            Err(Error::UnknownCrop("kiwi".into()))
        );
        assert!(matches!(
            "organic".parse::<ProgramType>(),
            Err(Error::UnknownProgram(_))
        ));
        assert!(matches!(
            "Class C".parse::<WaterEfficiencyClass>(),
            Err(Error::UnknownWaterEfficiencyClass(_))
        ));
    }

    #[test]
    fn prodi_reads_conversion_modifiers() {
        assert_eq!(ProgramType::Prodi.mode(), ProgramMode::Conversion);
        assert_eq!(ProgramType::BioConversion.mode(), ProgramMode::Conversion);
        assert_eq!(ProgramType::BioMaintenance.mode(), ProgramMode::Maintenance);
    }

    #[test]
    fn serde_uses_canonical_labels() {
        let json = serde_json::to_string(&WaterEfficiencyClass::BPlus).unwrap();
        assert_eq!(json, "\"Class B+\"");
        let crop: CropType = serde_json::from_str("\"vinha\"").unwrap();
        assert_eq!(crop, CropType::Vinha);
        let watering: WateringMethod = serde_json::from_str("\"rain\"").unwrap();
        assert_eq!(watering.to_string(), "rain-fed");
        assert!(serde_json::from_str::<CropType>("\"kiwi\"").is_err());
    }
}
