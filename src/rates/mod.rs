//! Tiered per-hectare rate schedules and the additive modifier rates.

mod tables;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    grant::normalize_area,
    model::{CropType, ProgramMode, ProgramType, WaterEfficiencyClass, WateringMethod},
};

pub use tables::BUILTIN;

/// One rate per program column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgramRates {
    pub bio_conversion: f64,
    pub bio_maintenance: f64,
    pub prodi: f64,
}

impl ProgramRates {
    pub fn get(&self, program: ProgramType) -> f64 {
        match program {
            ProgramType::BioConversion => self.bio_conversion,
            ProgramType::BioMaintenance => self.bio_maintenance,
            ProgramType::Prodi => self.prodi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Inclusive upper bound in hectares; `None` on the last tier.
    #[serde(default)]
    pub max_area: Option<f64>,
    pub rates: ProgramRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub tiers: [Tier; 4],
}

impl TierTable {
    /// Index of the tier an area falls into. An area equal to a threshold
    /// stays in the lower tier.
    pub fn tier_index(&self, area: f64) -> usize {
        let area = normalize_area(area);
        self.tiers
            .iter()
            .position(|tier| match tier.max_area {
                Some(max) => area <= max,
                None => true,
            })
            .unwrap_or(self.tiers.len() - 1)
    }

    pub fn rate(&self, area: f64, program: ProgramType) -> f64 {
        self.tiers[self.tier_index(area)].rates.get(program)
    }

    fn validate(&self, name: &str) -> Result<()> {
        let last = self.tiers.len() - 1;
        let mut previous = 0.0_f64;
        for (index, tier) in self.tiers.iter().enumerate() {
            match (index == last, tier.max_area) {
                (true, Some(max)) => {
                    return Err(Error::InvalidRateCard(format!(
                        "{name}: last tier must be unbounded, found max_area {max}"
                    )));
                }
                (false, None) => {
                    return Err(Error::InvalidRateCard(format!(
                        "{name}: tier {} must define max_area",
                        index + 1
                    )));
                }
                (false, Some(max)) => {
                    if !max.is_finite() || max <= previous {
                        return Err(Error::InvalidRateCard(format!(
                            "{name}: tier {} max_area {max} must be greater than {previous}",
                            index + 1
                        )));
                    }
                    previous = max;
                }
                (true, None) => {}
            }
            for program in ProgramType::ALL {
                check_rate(name, program.as_str(), tier.rates.get(program))?;
            }
        }
        Ok(())
    }
}

/// A crop schedule split by watering method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTables {
    pub irrigation: TierTable,
    pub rain_fed: TierTable,
}

impl CropTables {
    pub fn for_watering(&self, watering: WateringMethod) -> &TierTable {
        match watering {
            WateringMethod::Irrigation => &self.irrigation,
            WateringMethod::RainFed => &self.rain_fed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeRates {
    pub conversion: f64,
    pub maintenance: f64,
}

impl ModeRates {
    pub fn get(&self, mode: ProgramMode) -> f64 {
        match mode {
            ProgramMode::Conversion => self.conversion,
            ProgramMode::Maintenance => self.maintenance,
        }
    }
}

/// Rates for the certified classes. Class "None" is always zero and has no
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterEfficiencyRates {
    pub class_a: ModeRates,
    pub class_b_plus: ModeRates,
    pub class_b: ModeRates,
}

impl WaterEfficiencyRates {
    pub fn get(&self, class: WaterEfficiencyClass, mode: ProgramMode) -> f64 {
        match class {
            WaterEfficiencyClass::A => self.class_a.get(mode),
            WaterEfficiencyClass::BPlus => self.class_b_plus.get(mode),
            WaterEfficiencyClass::B => self.class_b.get(mode),
            WaterEfficiencyClass::None => 0.0,
        }
    }
}

/// The complete rate schedule: base tables per crop plus modifier rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub fresh_fruit: CropTables,
    pub olival_frutos_secos: CropTables,
    pub vinha: TierTable,
    pub ground_cover: ModeRates,
    pub water_efficiency: WaterEfficiencyRates,
}

impl Default for RateCard {
    fn default() -> Self {
        BUILTIN
    }
}

impl RateCard {
    /// Base table for a crop. Vinha has a single schedule and ignores the
    /// watering method.
    pub fn table(&self, crop: CropType, watering: WateringMethod) -> &TierTable {
        match crop {
            CropType::FreshFruit => self.fresh_fruit.for_watering(watering),
            CropType::Olival | CropType::FrutosSecos => {
                self.olival_frutos_secos.for_watering(watering)
            }
            CropType::Vinha => &self.vinha,
        }
    }

    pub fn rate(
        &self,
        crop: CropType,
        area: f64,
        program: ProgramType,
        watering: WateringMethod,
    ) -> f64 {
        self.table(crop, watering).rate(area, program)
    }

    pub fn ground_cover_rate(&self, mode: ProgramMode) -> f64 {
        self.ground_cover.get(mode)
    }

    /// Per-hectare water efficiency rate. Only irrigated land qualifies.
    pub fn water_efficiency_rate(
        &self,
        watering: WateringMethod,
        class: WaterEfficiencyClass,
        mode: ProgramMode,
    ) -> f64 {
        match watering {
            WateringMethod::Irrigation => self.water_efficiency.get(class, mode),
            WateringMethod::RainFed => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.fresh_fruit.irrigation.validate("fresh_fruit.irrigation")?;
        self.fresh_fruit.rain_fed.validate("fresh_fruit.rain_fed")?;
        self.olival_frutos_secos
            .irrigation
            .validate("olival_frutos_secos.irrigation")?;
        self.olival_frutos_secos
            .rain_fed
            .validate("olival_frutos_secos.rain_fed")?;
        self.vinha.validate("vinha")?;
        let modifiers = [
            ("ground_cover", self.ground_cover),
            ("water_efficiency.class_a", self.water_efficiency.class_a),
            ("water_efficiency.class_b_plus", self.water_efficiency.class_b_plus),
            ("water_efficiency.class_b", self.water_efficiency.class_b),
        ];
        for (name, rates) in modifiers {
            check_rate(name, "conversion", rates.conversion)?;
            check_rate(name, "maintenance", rates.maintenance)?;
        }
        Ok(())
    }
}

fn check_rate(table: &str, column: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRateCard(format!(
            "{table}: {column} rate {value} must be a non-negative number"
        )))
    }
}

/// Per-hectare base rate from the built-in schedule.
pub fn compute_rate(
    crop: CropType,
    area: f64,
    program: ProgramType,
    watering: WateringMethod,
) -> f64 {
    BUILTIN.rate(crop, area, program, watering)
}

pub struct RateCardLoader {
    base_dir: PathBuf,
}

impl RateCardLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> anyhow::Result<RateCard> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read rate card {}", path.display()))?;
        let card: RateCard = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        card.validate()
            .with_context(|| format!("Rejected rate card {}", path.display()))?;
        log::info!("loaded rate card from {}", path.display());
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_WATERING: [WateringMethod; 2] = [WateringMethod::Irrigation, WateringMethod::RainFed];

    #[test]
    fn known_rates() {
        for watering in ALL_WATERING {
            assert_eq!(
                compute_rate(CropType::Vinha, 12.0, ProgramType::BioConversion, watering),
                504.0
            );
        }
        assert_eq!(
            compute_rate(
                CropType::FreshFruit,
                10.0,
                ProgramType::BioConversion,
                WateringMethod::Irrigation
            ),
            975.0
        );
        assert_eq!(
            compute_rate(
                CropType::FreshFruit,
                10.01,
                ProgramType::BioConversion,
                WateringMethod::Irrigation
            ),
            780.0
        );
    }

    #[test]
    fn boundaries_are_inclusive() {
        let card = RateCard::default();
        for crop in CropType::ALL {
            for watering in ALL_WATERING {
                let table = card.table(crop, watering);
                for (index, tier) in table.tiers.iter().enumerate() {
                    if let Some(max) = tier.max_area {
                        assert_eq!(table.tier_index(max), index);
                        assert_eq!(table.tier_index(max + 1e-6), index + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn rates_step_down_at_every_boundary() {
        let card = RateCard::default();
        for crop in CropType::ALL {
            for watering in ALL_WATERING {
                for program in ProgramType::ALL {
                    let table = card.table(crop, watering);
                    let mut lower = 0.0;
                    let mut previous_rate = f64::INFINITY;
                    for tier in &table.tiers {
                        let rate = tier.rates.get(program);
                        assert!(rate < previous_rate, "{crop} {watering} {program}");
                        let upper = tier.max_area.unwrap_or(lower + 100.0);
                        let mid = (lower + upper) / 2.0;
                        assert_eq!(card.rate(crop, mid, program, watering), rate);
                        assert_eq!(card.rate(crop, upper, program, watering), rate);
                        previous_rate = rate;
                        lower = upper;
                    }
                }
            }
        }
    }

    #[test]
    fn olival_and_frutos_secos_share_tables() {
        let card = RateCard::default();
        for watering in ALL_WATERING {
            assert_eq!(
                card.table(CropType::Olival, watering),
                card.table(CropType::FrutosSecos, watering)
            );
        }
    }

    #[test]
    fn water_efficiency_needs_irrigation() {
        let card = RateCard::default();
        for class in WaterEfficiencyClass::ALL {
            assert_eq!(
                card.water_efficiency_rate(WateringMethod::RainFed, class, ProgramMode::Conversion),
                0.0
            );
        }
        assert_eq!(
            card.water_efficiency_rate(
                WateringMethod::Irrigation,
                WaterEfficiencyClass::BPlus,
                ProgramMode::Maintenance
            ),
            200.0
        );
        assert_eq!(
            card.water_efficiency_rate(
                WateringMethod::Irrigation,
                WaterEfficiencyClass::None,
                ProgramMode::Conversion
            ),
            0.0
        );
    }

    #[test]
    fn builtin_card_is_valid() {
        RateCard::default().validate().unwrap();
    }

    #[test]
    fn validation_rejects_bad_thresholds() {
        let mut card = RateCard::default();
        card.vinha.tiers[1].max_area = Some(5.0);
        assert!(matches!(card.validate(), Err(Error::InvalidRateCard(_))));

        let mut card = RateCard::default();
        card.vinha.tiers[3].max_area = Some(100.0);
        assert!(matches!(card.validate(), Err(Error::InvalidRateCard(_))));

        let mut card = RateCard::default();
        card.fresh_fruit.rain_fed.tiers[2].max_area = None;
        assert!(matches!(card.validate(), Err(Error::InvalidRateCard(_))));
    }

    #[test]
    fn validation_rejects_negative_rates() {
        let mut card = RateCard::default();
        card.water_efficiency.class_b.maintenance = -1.0;
        assert!(matches!(card.validate(), Err(Error::InvalidRateCard(_))));

        let mut card = RateCard::default();
        card.olival_frutos_secos.irrigation.tiers[0].rates.prodi = f64::NAN;
        assert!(matches!(card.validate(), Err(Error::InvalidRateCard(_))));
    }

    #[test]
    fn loader_round_trips_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let mut card = RateCard::default();
        card.ground_cover.conversion = 210.0;
        std::fs::write(
            dir.path().join("card.yaml"),
            serde_yaml::to_string(&card).unwrap(),
        )
        .unwrap();

        let loaded = RateCardLoader::new(dir.path()).load("card.yaml").unwrap();
        assert_eq!(loaded.ground_cover_rate(ProgramMode::Conversion), 210.0);
        assert_eq!(loaded.vinha, card.vinha);
    }

    #[test]
    fn loader_rejects_invalid_card() {
        let dir = tempfile::tempdir().unwrap();
        let mut card = RateCard::default();
        card.vinha.tiers[0].max_area = Some(30.0);
        std::fs::write(
            dir.path().join("card.yaml"),
            serde_yaml::to_string(&card).unwrap(),
        )
        .unwrap();

        let err = RateCardLoader::new(dir.path())
            .load("card.yaml")
            .unwrap_err();
        assert!(format!("{err:#}").contains("vinha"));
    }
}
