/// Great-circle distance in kilometers between two coordinates (haversine).
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Sort `items` by distance from the origin, dropping those without coordinates.
pub fn sort_by_distance<T, F>(items: Vec<T>, origin: (f64, f64), coords: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Option<(f64, f64)>,
{
    let mut with_distance: Vec<(T, f64)> = items
        .into_iter()
        .filter_map(|item| {
            let (lat, lng) = coords(&item)?;
            let distance = haversine_distance(origin.0, origin.1, lat, lng);
            Some((item, distance))
        })
        .collect();

    with_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    with_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUNIS: (f64, f64) = (36.8065, 10.1815);
    const SOUSSE: (f64, f64) = (35.8256, 10.6369);
    const SIDI_BOU_SAID: (f64, f64) = (36.8687, 10.3416);

    #[test]
    fn test_haversine_tunis_sousse() {
        let distance = haversine_distance(TUNIS.0, TUNIS.1, SOUSSE.0, SOUSSE.1);
        // Roughly 115 km as the crow flies
        assert!(distance > 100.0 && distance < 130.0);
    }

    #[test]
    fn test_sort_by_distance_orders_and_skips_unknown() {
        let cities = vec![
            ("sousse", Some(SOUSSE)),
            ("nowhere", None),
            ("sidi-bou-said", Some(SIDI_BOU_SAID)),
        ];

        let sorted = sort_by_distance(cities, TUNIS, |c| c.1);
        let names: Vec<&str> = sorted.iter().map(|(c, _)| c.0).collect();

        assert_eq!(names, vec!["sidi-bou-said", "sousse"]);
        assert!(sorted[0].1 < sorted[1].1);
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(is_valid_coordinate(TUNIS.0, TUNIS.1));
        assert!(!is_valid_coordinate(91.0, 10.0));
        assert!(!is_valid_coordinate(36.0, -181.0));
    }
}
