//! Static table of US and Australian states and the concert cities the
//! upstream dataset places in them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Country {
    Usa,
    Australia,
}

impl Country {
    fn matches(self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        match self {
            Country::Usa => matches!(name.as_str(), "usa" | "us" | "united states"),
            Country::Australia => name == "australia",
        }
    }
}

/// (state, country, lowercase city names)
const STATES: &[(&str, Country, &[&str])] = &[
    ("Washington", Country::Usa, &["seattle"]),
    (
        "California",
        Country::Usa,
        &[
            "los angeles",
            "anaheim",
            "oakland",
            "del mar",
            "san francisco",
            "pico rivera",
            "inglewood",
            "san diego",
        ],
    ),
    ("Missouri", Country::Usa, &["kansas city", "st louis", "saint louis"]),
    ("Texas", Country::Usa, &["dallas", "houston", "austin"]),
    ("Georgia", Country::Usa, &["atlanta"]),
    ("Massachusetts", Country::Usa, &["boston"]),
    ("New York", Country::Usa, &["new york", "brooklyn", "uniondale"]),
    ("New Jersey", Country::Usa, &["newark", "east rutherford"]),
    ("Illinois", Country::Usa, &["chicago", "berwyn", "rosemont"]),
    (
        "Pennsylvania",
        Country::Usa,
        &["philadelphia", "pittsburgh", "hershey"],
    ),
    ("Michigan", Country::Usa, &["grand rapids", "detroit"]),
    ("Indiana", Country::Usa, &["indianapolis"]),
    ("Ohio", Country::Usa, &["cleveland", "cincinnati", "columbus"]),
    ("Nebraska", Country::Usa, &["omaha"]),
    ("North Carolina", Country::Usa, &["charlotte", "raleigh"]),
    ("South Carolina", Country::Usa, &["columbia"]),
    ("Louisiana", Country::Usa, &["new orleans"]),
    ("Wisconsin", Country::Usa, &["madison", "milwaukee"]),
    ("Nevada", Country::Usa, &["las vegas"]),
    ("Arizona", Country::Usa, &["phoenix"]),
    ("Florida", Country::Usa, &["miami", "orlando", "tampa"]),
    ("New South Wales", Country::Australia, &["sydney", "newcastle"]),
    ("Victoria", Country::Australia, &["melbourne", "geelong"]),
    ("Queensland", Country::Australia, &["brisbane", "gold coast"]),
    ("Western Australia", Country::Australia, &["perth"]),
    ("South Australia", Country::Australia, &["adelaide"]),
];

/// States a formatted location (`"Los Angeles, Usa"`) belongs to.
///
/// A location whose city part is itself a state name (`"Georgia, Usa"`)
/// belongs to that state.
pub fn states_for_location(formatted: &str) -> Vec<&'static str> {
    let Some((city, country)) = formatted.split_once(", ") else {
        return Vec::new();
    };
    let city = city.trim().to_lowercase();

    STATES
        .iter()
        .filter(|(state, state_country, cities)| {
            state_country.matches(country)
                && (cities.contains(&city.as_str()) || state.to_lowercase() == city)
        })
        .map(|(state, _, _)| *state)
        .collect()
}

/// Canonical name of a state, matched case-insensitively.
pub fn canonical_state(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATES
        .iter()
        .map(|(state, _, _)| *state)
        .find(|state| state.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_resolves_to_state() {
        assert_eq!(states_for_location("Los Angeles, Usa"), ["California"]);
        assert_eq!(states_for_location("Sydney, Australia"), ["New South Wales"]);
    }

    #[test]
    fn state_named_location_resolves_to_itself() {
        assert_eq!(states_for_location("North Carolina, Usa"), ["North Carolina"]);
        assert_eq!(states_for_location("Georgia, Usa"), ["Georgia"]);
    }

    #[test]
    fn country_must_agree() {
        // Perth in Scotland is not Western Australia
        assert!(states_for_location("Perth, Uk").is_empty());
        assert!(states_for_location("Georgia, Georgia").is_empty());
    }

    #[test]
    fn location_without_country_has_no_state() {
        assert!(states_for_location("Seattle").is_empty());
    }

    #[test]
    fn canonical_state_is_case_insensitive() {
        assert_eq!(canonical_state(" new south wales "), Some("New South Wales"));
        assert_eq!(canonical_state("CALIFORNIA"), Some("California"));
        assert_eq!(canonical_state("Bavaria"), None);
    }
}
