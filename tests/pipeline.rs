use approx::assert_relative_eq;
use geo::{polygon, MultiPolygon};

use dronedemand::{
    io, run, Building, Buildings, CensusTracts, DeliveryClass, DemandComponents, HeightSource, PipelineConfig,
    RuleSet, MEDIAN_INCOME, TOTAL_POPULATION,
};

/// A ~10m square building with its corner at (lon, lat).
fn footprint(lon: f64, lat: f64) -> MultiPolygon<f64> {
    let d = 0.0001;
    MultiPolygon(vec![polygon![
        (x: lon, y: lat), (x: lon + d, y: lat), (x: lon + d, y: lat + d), (x: lon, y: lat + d),
    ]])
}

/// A square tract of side `size` degrees with its corner at (lon, lat).
fn tract(lon: f64, lat: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: lon, y: lat), (x: lon + size, y: lat), (x: lon + size, y: lat + size), (x: lon, y: lat + size),
    ]])
}

fn house(id: &str, lon: f64, lat: f64) -> Building {
    Building::new(id, footprint(lon, lat)).with_tag("building", "house")
}

#[test]
fn heights_resolve_from_tags_then_nearest_neighbor() {
    // The third building sits next to the first, far from the second.
    let buildings = Buildings::new(vec![
        house("a", -97.7400, 30.2700).with_tag("height", "5"),
        house("b", -97.7500, 30.2700).with_tag("building:levels", "4"),
        house("c", -97.7402, 30.2700),
    ]);
    let config = PipelineConfig { height: dronedemand::HeightEstimator { k: 1, ..Default::default() }, ..Default::default() };

    let output = run(&buildings, None, &RuleSet::default(), &config).unwrap();
    let heights: Vec<_> = output.buildings.iter().map(|b| b.height).collect();
    assert_eq!(heights, [Some(5.0), Some(12.0), Some(5.0)]);

    let sources: Vec<_> = output.buildings.iter().map(|b| b.height_source).collect();
    assert_eq!(sources, [Some(HeightSource::Native), Some(HeightSource::Levels), Some(HeightSource::Knn)]);
    assert_eq!(output.buildings.get(2).unwrap().neighbor_info.as_ref().unwrap().indices, vec![0]);
    assert!(output.allocation.is_none());
}

#[test]
fn population_is_conserved_per_tract() {
    let tracts = CensusTracts::from_columns(
        vec!["48453000101".into(), "48453000102".into()],
        vec![tract(-97.75, 30.26, 0.01), tract(-97.74, 30.26, 0.01)],
        vec![
            (TOTAL_POPULATION.into(), vec![Some(1200.0), Some(300.0)]),
            (MEDIAN_INCOME.into(), vec![Some(72_000.0), Some(-666_666_666.0)]),
        ],
        None,
    ).unwrap();

    let buildings = Buildings::new(vec![
        house("r1", -97.7480, 30.2620),
        house("r2", -97.7460, 30.2650),
        Building::new("r3", MultiPolygon(vec![polygon![
            (x: -97.7440, y: 30.2640), (x: -97.7436, y: 30.2640), (x: -97.7436, y: 30.2644), (x: -97.7440, y: 30.2644),
        ]])).with_tag("residential", "yes"),
        house("r4", -97.7350, 30.2620),
        Building::new("shop", footprint(-97.7470, 30.2630)).with_tag("shop", "supermarket").with_tag("residential", "yes"),
        house("outside", -97.9000, 30.2000),
    ]);

    let output = run(&buildings, Some(&tracts), &RuleSet::default(), &PipelineConfig::default()).unwrap();
    let report = output.allocation.as_ref().unwrap();

    let total = |tract: u32| -> f64 {
        output.buildings.iter()
            .filter(|b| b.tract == Some(tract))
            .map(|b| b.estimated_population)
            .sum()
    };
    assert_relative_eq!(total(0), 1200.0, max_relative = 1e-6);
    assert_relative_eq!(total(1), 300.0, max_relative = 1e-6);
    assert_eq!(report.participating, 5);
    assert_eq!(report.unassociated, 1);

    // The larger footprint takes the larger share in its tract.
    let r1 = output.buildings.get(0).unwrap();
    let r3 = output.buildings.get(2).unwrap();
    assert!(r3.estimated_population > r1.estimated_population);

    let shop = output.buildings.get(4).unwrap();
    assert_eq!(shop.delivery_class, Some(DeliveryClass::DO));
    assert_eq!(shop.estimated_population, 0.0);
    assert_eq!(output.buildings.get(5).unwrap().estimated_population, 0.0);

    // The ACS sentinel is not an income.
    assert_eq!(r1.income, Some(72_000.0));
    assert_eq!(output.buildings.get(3).unwrap().income, None);

    assert_eq!(output.classification.total, 6);
    assert_eq!(output.classification.count(DeliveryClass::DD), 5);
    assert!(output.buildings.iter().all(|b| b.demand_potential.is_some_and(f64::is_finite)));
    assert!(output.summary.hotspot_count >= 1);
}

#[test]
fn disabled_components_give_unit_demand() {
    let buildings = Buildings::new(vec![
        house("a", -97.7400, 30.27).with_tag("height", "40"),
        house("b", -97.7410, 30.27),
        Building::new("c", footprint(-97.7420, 30.27)).with_tag("amenity", "cafe"),
    ]);
    let mut config = PipelineConfig::default();
    config.height.k = 1;
    config.demand.components = DemandComponents::none();

    let output = run(&buildings, None, &RuleSet::default(), &config).unwrap();
    assert!(output.buildings.iter().all(|b| b.demand_potential == Some(1.0)));
    // Every score equals the threshold, so all are hotspots.
    assert_eq!(output.summary.hotspot_count, 3);
    assert_relative_eq!(output.summary.total_demand, 3.0);
}

#[test]
fn invalid_config_stops_the_run() {
    let buildings = Buildings::new(vec![house("a", -97.74, 30.27)]);
    let mut config = PipelineConfig::default();
    config.demand.current_hour = Some(24);
    let err = run(&buildings, None, &RuleSet::default(), &config).unwrap_err();
    assert!(matches!(err, dronedemand::Error::Configuration { .. }));
}

#[test]
fn rule_file_round_trips_and_changes_classification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");

    let mut rules = RuleSet::default();
    rules.save(&path).unwrap();
    assert_eq!(RuleSet::load(Some(&path)).unwrap(), rules);

    // Residential outranks retail once its priority drops below 1.
    rules.category_mut(DeliveryClass::DD).unwrap().priority = 0;
    rules.save(&path).unwrap();
    let reloaded = RuleSet::load(Some(&path)).unwrap();

    let buildings = Buildings::new(vec![
        house("mixed", -97.74, 30.27).with_tag("shop", "supermarket").with_tag("height", "9"),
    ]);
    let output = run(&buildings, None, &reloaded, &PipelineConfig::default()).unwrap();
    assert_eq!(output.buildings.get(0).unwrap().delivery_class, Some(DeliveryClass::DD));

    let missing = dir.path().join("absent.json");
    assert_eq!(RuleSet::load(Some(&missing)).unwrap(), RuleSet::default());
}

#[test]
fn files_in_files_out() {
    let dir = tempfile::tempdir().unwrap();
    let buildings_path = dir.path().join("buildings.geojson");
    let tracts_path = dir.path().join("tracts.geojson");

    std::fs::write(&buildings_path, r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": 101,
             "geometry": {"type": "Polygon", "coordinates": [[[-97.7480, 30.2620], [-97.7479, 30.2620], [-97.7479, 30.2621], [-97.7480, 30.2621], [-97.7480, 30.2620]]]},
             "properties": {"building": "apartments", "building:levels": 6}},
            {"type": "Feature", "id": 102,
             "geometry": {"type": "Polygon", "coordinates": [[[-97.7470, 30.2630], [-97.7469, 30.2630], [-97.7469, 30.2631], [-97.7470, 30.2631], [-97.7470, 30.2630]]]},
             "properties": {"amenity": "restaurant", "height": "7.5"}}
        ]
    }"#).unwrap();
    std::fs::write(&tracts_path, r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[-97.75, 30.26], [-97.74, 30.26], [-97.74, 30.27], [-97.75, 30.27], [-97.75, 30.26]]]},
             "properties": {"GEOID": "48453000101", "B01003_001E": "950", "B19013_001E": 58000}}
        ]
    }"#).unwrap();

    let buildings = io::read_buildings(&buildings_path).unwrap();
    let tracts = io::read_tracts_geojson(&tracts_path).unwrap();
    let mut config = PipelineConfig::default();
    config.height.k = 1;

    let output = run(&buildings, Some(&tracts), &RuleSet::default(), &config).unwrap();

    let out_path = dir.path().join("demand.geojson");
    let csv_path = dir.path().join("demand.csv");
    io::write_buildings_geojson(&output.buildings, &out_path).unwrap();
    io::write_buildings_csv(&output.buildings, &csv_path).unwrap();

    let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&out_path).unwrap()).unwrap();
    let first = &written["features"][0]["properties"];
    assert_eq!(first["id"], "101");
    assert_eq!(first["height"], 18.0);
    assert_eq!(first["height_source"], "building:levels");
    assert_eq!(first["delivery_class"], "DD");
    assert_eq!(first["estimated_population"], 950.0);
    assert_eq!(first["income"], 58000.0);
    assert_eq!(written["features"][1]["properties"]["delivery_class"], "DO");

    let table = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(table.lines().count(), 3);
}
