use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::{
    model::{CropType, ProgramType, WaterEfficiencyClass, WateringMethod},
    rates::{RateCard, BUILTIN},
};

/// Clamp user-supplied area to a usable value. Anything that is not a finite
/// non-negative number becomes zero.
pub fn normalize_area(area: f64) -> f64 {
    if area.is_finite() && area > 0.0 {
        area
    } else {
        0.0
    }
}

/// Lenient text parse for form and query input: unparsable text is zero.
///
/// A comma marks the decimal part (`7,5`, `1.000,5`); dots before it are
/// thousands separators. Without a comma the dot is the decimal point.
pub fn parse_area(text: &str) -> f64 {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let plain = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };
    plain.parse::<f64>().map(normalize_area).unwrap_or(0.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AreaValue {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Serde hook for area fields: numbers, numeric text, null or anything else
/// all land on a normalized area.
pub fn deserialize_area<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let area = match Option::<AreaValue>::deserialize(deserializer)? {
        Some(AreaValue::Number(value)) => normalize_area(value),
        Some(AreaValue::Text(text)) => parse_area(&text),
        Some(AreaValue::Other(_)) | None => 0.0,
    };
    Ok(area)
}

/// Everything a grant calculation needs for one crop type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub crop: CropType,
    #[serde(default, deserialize_with = "deserialize_area")]
    pub area: f64,
    pub program: ProgramType,
    #[serde(default)]
    pub watering_method: WateringMethod,
    #[serde(default)]
    pub ground_cover: bool,
    #[serde(default)]
    pub water_efficiency: WaterEfficiencyClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrantBreakdown {
    pub crop: CropType,
    pub program: ProgramType,
    pub area: f64,
    pub rate_per_ha: f64,
    pub base_amount: f64,
    pub ground_cover_amount: f64,
    pub water_efficiency_amount: f64,
    pub total: f64,
}

impl GrantBreakdown {
    pub fn is_empty(&self) -> bool {
        self.area == 0.0
    }
}

impl RateCard {
    pub fn grant(&self, request: &GrantRequest) -> GrantBreakdown {
        let area = normalize_area(request.area);
        let mode = request.program.mode();
        let rate_per_ha = self.rate(
            request.crop,
            area,
            request.program,
            request.watering_method,
        );
        let base_amount = rate_per_ha * area;
        let ground_cover_amount = if request.ground_cover {
            area * self.ground_cover_rate(mode)
        } else {
            0.0
        };
        let water_efficiency_amount = area
            * self.water_efficiency_rate(
                request.watering_method,
                request.water_efficiency,
                mode,
            );

        GrantBreakdown {
            crop: request.crop,
            program: request.program,
            area,
            rate_per_ha,
            base_amount,
            ground_cover_amount,
            water_efficiency_amount,
            total: base_amount + ground_cover_amount + water_efficiency_amount,
        }
    }
}

/// Total grant for one crop type under the built-in schedule.
pub fn compute_grant(
    crop: CropType,
    area: f64,
    program: ProgramType,
    watering: WateringMethod,
    ground_cover: bool,
    water_efficiency: WaterEfficiencyClass,
) -> f64 {
    BUILTIN
        .grant(&GrantRequest {
            crop,
            area,
            program,
            watering_method: watering,
            ground_cover,
            water_efficiency,
        })
        .total
}
