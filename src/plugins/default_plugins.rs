use crate::plugins::loader::{PluginDefinition, PluginDefinitions, SearchPatterns};
use crate::plugins::parsers::ParserKind;

impl PluginDefinitions {
    /// Built-in drone and flight-log plugins
    pub fn default_definitions() -> Self {
        PluginDefinitions {
            version: "1.0".into(),
            description: "Default drone log artifact plugins".into(),
            plugins: vec![
                // DJI Go / Fly app flight records
                PluginDefinition {
                    name: "DJI Flight Records".into(),
                    category: "DJI Flight Records".into(),
                    module_name: "dji_flight_records".into(),
                    search: SearchPatterns::Many(vec![
                        "**/FlightRecord/DJIFlightRecord_*.txt".into(),
                        "**/FlightRecords/*.txt".into(),
                    ]),
                    parser: ParserKind::Inventory,
                    description: Some("Encrypted flight record files kept by DJI apps".into()),
                },
                // Aircraft-side DAT logs
                PluginDefinition {
                    name: "DJI DAT Logs".into(),
                    category: "DJI Aircraft Logs".into(),
                    module_name: "dji_dat".into(),
                    search: SearchPatterns::Many(vec![
                        "**/FLY[0-9][0-9][0-9].DAT".into(),
                        "**/*.DAT".into(),
                    ]),
                    parser: ParserKind::Inventory,
                    description: Some("Flight controller DAT logs".into()),
                },
                // Exported CSV flight logs
                PluginDefinition {
                    name: "Flight CSV Logs".into(),
                    category: "Flight Logs".into(),
                    module_name: "flight_csv".into(),
                    search: SearchPatterns::Many(vec!["**/logs/*.csv".into()]),
                    parser: ParserKind::CsvRows,
                    description: Some("Flight logs exported as CSV".into()),
                },
                PluginDefinition {
                    name: "Litchi Logs".into(),
                    category: "Litchi".into(),
                    module_name: "litchi".into(),
                    search: SearchPatterns::One("**/Litchi/**/*.csv".into()),
                    parser: ParserKind::CsvRows,
                    description: Some("Litchi mission and flight logs".into()),
                },
                PluginDefinition {
                    name: "Parrot Flight Logs".into(),
                    category: "Parrot".into(),
                    module_name: "parrot".into(),
                    search: SearchPatterns::Many(vec![
                        "**/FreeFlight*/**/*.json".into(),
                        "**/academy/*.pud".into(),
                    ]),
                    parser: ParserKind::Inventory,
                    description: Some("Parrot FreeFlight flight data".into()),
                },
            ],
        }
    }
}
