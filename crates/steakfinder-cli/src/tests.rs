use super::*;
use steakfinder_core::{DirectionsTarget, DistanceUnit, RestaurantCategory, RestaurantRecord};
use steakfinder_places::SearchResults;

fn record(id: &str, name: &str, types: &[&str], distance_km: f64) -> RestaurantRecord {
    RestaurantRecord {
        id: id.to_string(),
        name: name.to_string(),
        rating: 4.6,
        price_level: Some(2),
        address: "1 Main St".to_string(),
        category_types: types.iter().map(ToString::to_string).collect(),
        coordinates: None,
        distance_km,
        is_open_now: Some(true),
        website_url: None,
        directions: Some(DirectionsTarget {
            place_id: id.to_string(),
            name: name.to_string(),
        }),
        photo_count: 0,
    }
}

fn results(restaurants: Vec<RestaurantRecord>) -> SearchResults {
    SearchResults {
        origin: Coordinates::new(37.7749, -122.4194),
        unit: DistanceUnit::Miles,
        restaurants,
        from_cache: false,
        failed_categories: Vec::new(),
    }
}

#[test]
fn parses_find_command_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "steakfinder",
        "find",
        "--lat",
        "37.7749",
        "--lng",
        "-122.4194",
        "--category",
        "korean",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Find {
            lat,
            lng,
            category,
            proxy_url: None,
            cache_path: None,
        }) => {
            assert!((lat - 37.7749).abs() < f64::EPSILON);
            assert!((lng + 122.4194).abs() < f64::EPSILON);
            assert_eq!(category.as_deref(), Some("korean"));
        }
        other => panic!("unexpected parse: {other:?}"),
    }
}

#[test]
fn find_requires_coordinates() {
    assert!(Cli::try_parse_from(["steakfinder", "find", "--lat", "1.0"]).is_err());
}

#[test]
fn parses_distance_command() {
    let cli = Cli::try_parse_from(["steakfinder", "distance", "39.0", "-77.0", "48.0", "2.0"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Distance { .. })));
}

#[test]
fn parses_geocode_command() {
    let cli = Cli::try_parse_from(["steakfinder", "geocode", "Union Square, San Francisco"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode { ref address }) if address == "Union Square, San Francisco"
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["steakfinder"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn distance_output_has_km_and_miles() {
    let here = Coordinates::new(37.7749, -122.4194);
    assert_eq!(format_distance(here, here), "0.000 km\n0.000 mi");
}

#[test]
fn empty_results_print_try_again_message() {
    assert_eq!(
        find::render_results(&results(vec![]), None),
        find::NO_RESULTS
    );
}

#[test]
fn results_table_lists_rows_in_order() {
    let table = find::render_results(
        &results(vec![
            record("a", "Harris' Restaurant", &["steak_house"], 1.0),
            record("b", "Fogo de Chão", &["brazilian_restaurant"], 2.5),
        ]),
        None,
    );

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with('#'));
    assert!(lines[1].contains("Harris' Restaurant"));
    assert!(lines[1].contains("0.6 mi"));
    assert!(lines[1].contains("$$"));
    assert!(lines[2].contains("Fogo de Chão"));
    assert!(lines[2].contains("destination_place_id=b"));
}

#[test]
fn results_table_applies_category_filter() {
    let table = find::render_results(
        &results(vec![
            record("a", "Harris'", &["steak_house"], 1.0),
            record("b", "Fogo de Chão", &["brazilian_restaurant"], 2.5),
        ]),
        Some(RestaurantCategory::BrazilianBbq),
    );

    assert!(!table.contains("Harris'"));
    assert!(table.contains("Fogo de Chão"));

    let none = find::render_results(
        &results(vec![record("a", "Harris'", &["steak_house"], 1.0)]),
        Some(RestaurantCategory::KoreanBbq),
    );
    assert_eq!(none, find::NO_RESULTS);
}

#[test]
fn log_filter_falls_back_to_configured_level() {
    let filter = log_filter(None, "debug").expect("valid level");
    assert_eq!(filter.to_string(), "debug");
}

#[test]
fn log_filter_prefers_valid_rust_log() {
    let filter = log_filter(Some("steakfinder=trace"), "debug").expect("valid directives");
    assert_eq!(filter.to_string(), "steakfinder=trace");

    let filter = log_filter(Some("steakfinder=loudest"), "info").expect("fallback level");
    assert_eq!(filter.to_string(), "info");
}
