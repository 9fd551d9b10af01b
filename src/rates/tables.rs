use super::{CropTables, ModeRates, ProgramRates, RateCard, Tier, TierTable, WaterEfficiencyRates};

const fn tier(max_area: Option<f64>, bio_conversion: f64, bio_maintenance: f64, prodi: f64) -> Tier {
    Tier {
        max_area,
        rates: ProgramRates {
            bio_conversion,
            bio_maintenance,
            prodi,
        },
    }
}

const fn modes(conversion: f64, maintenance: f64) -> ModeRates {
    ModeRates {
        conversion,
        maintenance,
    }
}

pub const FRESH_FRUIT_IRRIGATION: TierTable = TierTable {
    tiers: [
        tier(Some(10.0), 975.0, 780.0, 600.0),
        tier(Some(15.0), 780.0, 624.0, 480.0),
        tier(Some(25.0), 585.0, 468.0, 360.0),
        tier(None, 293.0, 234.0, 180.0),
    ],
};

pub const FRESH_FRUIT_RAIN_FED: TierTable = TierTable {
    tiers: [
        tier(Some(10.0), 650.0, 520.0, 400.0),
        tier(Some(15.0), 520.0, 416.0, 320.0),
        tier(Some(25.0), 390.0, 312.0, 240.0),
        tier(None, 195.0, 156.0, 120.0),
    ],
};

// Olival and frutos secos share one schedule.
pub const OLIVAL_IRRIGATION: TierTable = TierTable {
    tiers: [
        tier(Some(10.0), 560.0, 448.0, 350.0),
        tier(Some(20.0), 448.0, 358.0, 280.0),
        tier(Some(50.0), 336.0, 269.0, 210.0),
        tier(None, 168.0, 134.0, 105.0),
    ],
};

pub const OLIVAL_RAIN_FED: TierTable = TierTable {
    tiers: [
        tier(Some(10.0), 300.0, 240.0, 190.0),
        tier(Some(20.0), 240.0, 192.0, 152.0),
        tier(Some(50.0), 180.0, 144.0, 114.0),
        tier(None, 90.0, 72.0, 57.0),
    ],
};

pub const VINHA: TierTable = TierTable {
    tiers: [
        tier(Some(10.0), 630.0, 504.0, 390.0),
        tier(Some(15.0), 504.0, 403.0, 312.0),
        tier(Some(25.0), 378.0, 302.0, 234.0),
        tier(None, 189.0, 151.0, 117.0),
    ],
};

pub const GROUND_COVER: ModeRates = modes(200.0, 150.0);

pub const WATER_EFFICIENCY: WaterEfficiencyRates = WaterEfficiencyRates {
    class_a: modes(300.0, 250.0),
    class_b_plus: modes(250.0, 200.0),
    class_b: modes(200.0, 150.0),
};

pub const BUILTIN: RateCard = RateCard {
    fresh_fruit: CropTables {
        irrigation: FRESH_FRUIT_IRRIGATION,
        rain_fed: FRESH_FRUIT_RAIN_FED,
    },
    olival_frutos_secos: CropTables {
        irrigation: OLIVAL_IRRIGATION,
        rain_fed: OLIVAL_RAIN_FED,
    },
    vinha: VINHA,
    ground_cover: GROUND_COVER,
    water_efficiency: WATER_EFFICIENCY,
};
