use std::collections::HashMap;

use super::sanitize::compare_names;
use super::{LocationMenuItem, Station};

/// City when known, otherwise the country.
pub fn location_category(station: &Station, default_country: &str) -> String {
    let city = station.city.trim();
    if !city.is_empty() {
        return city.to_string();
    }
    let country = station.country.trim();
    if country.is_empty() {
        default_country.to_string()
    } else {
        country.to_string()
    }
}

pub fn build_location_menu(stations: &[Station], default_country: &str) -> Vec<LocationMenuItem> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for station in stations {
        *counts
            .entry(location_category(station, default_country))
            .or_default() += 1;
    }

    let mut items: Vec<LocationMenuItem> = counts
        .into_iter()
        .map(|(name, count)| LocationMenuItem { name, count })
        .collect();
    items.sort_unstable_by(|a, b| compare_names(&a.name, &b.name));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn station(city: &str, country: &str) -> Station {
        Station {
            id: format!("{city}-{country}"),
            name: "Test".into(),
            frequency: String::new(),
            city: city.into(),
            country: country.into(),
            genre: String::new(),
            stream_url: "https://a.example/live.mp3".into(),
            language: String::new(),
            codec: String::new(),
            bitrate: 0,
            votes: 0,
            is_active: true,
        }
    }

    #[test]
    fn groups_by_city_then_country() {
        let stations = vec![
            station("Cebu", "Philippines"),
            station("", "Philippines"),
            station("cebu", ""),
            station("Cebu", "Philippines"),
            station(" ", " "),
            station("Davao", ""),
        ];
        assert_eq!(
            build_location_menu(&stations, "Philippines"),
            vec![
                LocationMenuItem { name: "cebu".into(), count: 1 },
                LocationMenuItem { name: "Cebu".into(), count: 2 },
                LocationMenuItem { name: "Davao".into(), count: 1 },
                LocationMenuItem { name: "Philippines".into(), count: 2 },
            ]
        );
    }
}
