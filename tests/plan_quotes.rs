use std::path::PathBuf;

use farm_grants::{
    plan::PlanLoader, CropType, ProgramType, RateCard, WaterEfficiencyClass, WateringMethod,
};

fn plan_loader() -> PlanLoader {
    PlanLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn plan_path(name: &str) -> PathBuf {
    PathBuf::from("plans").join(name)
}

#[test]
fn plan_loader_reads_fixture() {
    let plan = plan_loader().load(plan_path("mixed_farm.yaml")).expect("plan parses");
    assert_eq!(plan.program, ProgramType::BioConversion);
    assert_eq!(plan.crops.len(), 4);
    let fresh = plan.input(CropType::FreshFruit);
    assert!(fresh.ground_cover);
    assert_eq!(fresh.watering_method, WateringMethod::Irrigation);
    assert_eq!(fresh.water_efficiency, WaterEfficiencyClass::A);
    assert_eq!(plan.input(CropType::Vinha).watering_method, WateringMethod::RainFed);
}

#[test]
fn mixed_farm_quote_totals() {
    let plan = plan_loader().load(plan_path("mixed_farm.yaml")).unwrap();
    let quote = plan.quote(&RateCard::default());

    let expected = [
        (CropType::FreshFruit, 14_750.0),
        (CropType::Olival, 4_050.0),
        (CropType::FrutosSecos, 6_080.0),
        (CropType::Vinha, 8_448.0),
    ];
    for (crop, total) in expected {
        assert_eq!(quote.line(crop).unwrap().total, total, "{crop}");
    }
    assert_eq!(quote.total, 33_328.0);

    let profile = plan.profile();
    assert_eq!(profile.total_area, 52.5);
    assert_eq!(profile.active_crops.len(), 4);
}

#[test]
fn legacy_labels_and_unknown_crops() {
    let plan = plan_loader().load(plan_path("legacy_labels.json")).unwrap();
    assert_eq!(plan.program, ProgramType::BioMaintenance);
    assert_eq!(plan.crops.len(), 2);

    let quote = plan.quote(&RateCard::default());
    let fresh = quote.line(CropType::FreshFruit).unwrap();
    assert_eq!(fresh.water_efficiency_amount, 0.0);
    assert_eq!(fresh.total, 520.0 * 4.0);
    assert_eq!(quote.line(CropType::Vinha).unwrap().total, 151.0 * 30.0 + 150.0 * 30.0);
    assert_eq!(quote.total, 11_110.0);
}

#[test]
fn quoting_is_repeatable() {
    let plan = plan_loader().load(plan_path("mixed_farm.yaml")).unwrap();
    let card = RateCard::default();
    let first = plan.compare(&card);
    let second = plan.compare(&card);
    let totals = |quotes: &[farm_grants::Quote]| -> Vec<f64> {
        quotes.iter().map(|quote| quote.total).collect()
    };
    assert_eq!(totals(&first), totals(&second));
}

#[test]
fn missing_plan_reports_path() {
    let err = plan_loader().load(plan_path("nope.yaml")).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"));
}
