//! Farm plan: per-crop form inputs keyed by crop type, plus quoting.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    grant::{deserialize_area, normalize_area, GrantBreakdown, GrantRequest},
    model::{CropType, ProgramType, WaterEfficiencyClass, WateringMethod},
    rates::RateCard,
};

/// Length of the bio transition commitment.
pub const TRANSITION_PERIOD_YEARS: u32 = 3;

fn default_program() -> ProgramType {
    ProgramType::BioConversion
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropInput {
    #[serde(default, deserialize_with = "deserialize_area")]
    pub area: f64,
    #[serde(default)]
    pub ground_cover: bool,
    #[serde(default)]
    pub watering_method: WateringMethod,
    #[serde(default)]
    pub water_efficiency: WaterEfficiencyClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlan {
    #[serde(default = "default_program")]
    pub program: ProgramType,
    #[serde(default, deserialize_with = "known_crops")]
    pub crops: BTreeMap<CropType, CropInput>,
}

impl Default for FarmPlan {
    fn default() -> Self {
        Self {
            program: default_program(),
            crops: BTreeMap::new(),
        }
    }
}

/// Entries under crop keys we do not recognise are dropped so they
/// contribute nothing to any total. When one crop appears under several
/// spellings the canonical key wins.
fn known_crops<'de, D>(deserializer: D) -> Result<BTreeMap<CropType, CropInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, CropInput>::deserialize(deserializer)?;
    let mut crops: BTreeMap<CropType, (String, CropInput)> = BTreeMap::new();
    for (key, input) in raw {
        let crop = match key.parse::<CropType>() {
            Ok(crop) => crop,
            Err(err) => {
                log::warn!("ignoring plan entry: {err}");
                continue;
            }
        };
        match crops.get(&crop) {
            Some((kept, _)) if kept.as_str() == crop.as_str() => {
                log::warn!("ignoring plan entry '{key}': {crop} already given as '{kept}'");
            }
            Some((kept, _)) => {
                log::warn!("ignoring plan entry '{kept}': {crop} also given as '{key}'");
                crops.insert(crop, (key, input));
            }
            None => {
                crops.insert(crop, (key, input));
            }
        }
    }
    Ok(crops
        .into_iter()
        .map(|(crop, (_, input))| (crop, input))
        .collect())
}

impl FarmPlan {
    pub fn new(program: ProgramType) -> Self {
        Self {
            program,
            crops: BTreeMap::new(),
        }
    }

    pub fn input(&self, crop: CropType) -> CropInput {
        self.crops.get(&crop).copied().unwrap_or_default()
    }

    fn input_mut(&mut self, crop: CropType) -> &mut CropInput {
        self.crops.entry(crop).or_default()
    }

    pub fn set_program(&mut self, program: ProgramType) {
        self.program = program;
    }

    pub fn set_area(&mut self, crop: CropType, area: f64) {
        self.input_mut(crop).area = normalize_area(area);
    }

    pub fn set_ground_cover(&mut self, crop: CropType, enabled: bool) {
        self.input_mut(crop).ground_cover = enabled;
    }

    /// Switching to rain-fed clears the water efficiency class.
    pub fn set_watering_method(&mut self, crop: CropType, watering: WateringMethod) {
        let input = self.input_mut(crop);
        input.watering_method = watering;
        if watering == WateringMethod::RainFed {
            input.water_efficiency = WaterEfficiencyClass::None;
        }
    }

    pub fn set_water_efficiency(&mut self, crop: CropType, class: WaterEfficiencyClass) {
        self.input_mut(crop).water_efficiency = class;
    }

    /// Clears every crop input. A bio plan goes back to the conversion
    /// phase; PRODI stays PRODI.
    pub fn reset(&mut self) {
        self.crops.clear();
        if self.program == ProgramType::BioMaintenance {
            self.program = ProgramType::BioConversion;
        }
    }

    fn request(&self, crop: CropType, program: ProgramType) -> GrantRequest {
        let input = self.input(crop);
        GrantRequest {
            crop,
            area: input.area,
            program,
            watering_method: input.watering_method,
            ground_cover: input.ground_cover,
            water_efficiency: input.water_efficiency,
        }
    }

    pub fn quote(&self, card: &RateCard) -> Quote {
        self.quote_for(card, self.program)
    }

    pub fn quote_for(&self, card: &RateCard, program: ProgramType) -> Quote {
        let lines: Vec<GrantBreakdown> = CropType::ALL
            .iter()
            .map(|crop| card.grant(&self.request(*crop, program)))
            .collect();
        let total = lines.iter().map(|line| line.total).sum();
        log::debug!("quoted {} for {total:.2}", program);
        Quote {
            program,
            lines,
            total,
            generated_at: Utc::now(),
        }
    }

    /// The same plan quoted under every program.
    pub fn compare(&self, card: &RateCard) -> Vec<Quote> {
        ProgramType::ALL
            .iter()
            .map(|program| self.quote_for(card, *program))
            .collect()
    }

    pub fn profile(&self) -> FarmProfile {
        let active_crops: Vec<ActiveCrop> = CropType::ALL
            .iter()
            .map(|crop| (*crop, normalize_area(self.input(*crop).area)))
            .filter(|(_, area)| *area > 0.0)
            .map(|(crop, area)| ActiveCrop { crop, area })
            .collect();
        FarmProfile {
            total_area: active_crops.iter().map(|active| active.area).sum(),
            active_crops,
            transition_period_years: TRANSITION_PERIOD_YEARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub program: ProgramType,
    pub lines: Vec<GrantBreakdown>,
    pub total: f64,
    pub generated_at: DateTime<Utc>,
}

impl Quote {
    pub fn line(&self, crop: CropType) -> Option<&GrantBreakdown> {
        self.lines.iter().find(|line| line.crop == crop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCrop {
    pub crop: CropType,
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmProfile {
    pub total_area: f64,
    pub active_crops: Vec<ActiveCrop>,
    pub transition_period_years: u32,
}

pub struct PlanLoader {
    base_dir: PathBuf,
}

impl PlanLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Reads a YAML or JSON plan file.
    pub fn load(&self, file: impl AsRef<Path>) -> anyhow::Result<FarmPlan> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        let plan: FarmPlan = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(plan)
    }
}
