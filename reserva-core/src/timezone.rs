//! Curated time-zone presets and device-zone resolution.

use serde::Serialize;

/// A single presentable time-zone choice within a regional group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TzChoice {
    pub name: &'static str,
    pub zone: &'static str,
}

/// A regional grouping of presentable time zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TzGroup {
    pub region: &'static str,
    pub zones: &'static [TzChoice],
}

/// The curated regional list offered by the time-zone picker.
pub const TZ_GROUPS: &[TzGroup] = &[
    TzGroup {
        region: "America",
        zones: &[
            TzChoice { name: "Pacific Time", zone: "America/Los_Angeles" },
            TzChoice { name: "Mountain Time", zone: "America/Denver" },
            TzChoice { name: "Central Time", zone: "America/Chicago" },
            TzChoice { name: "Eastern Time", zone: "America/New_York" },
            TzChoice { name: "Alaska Time", zone: "America/Anchorage" },
            TzChoice { name: "Arizona Time", zone: "America/Phoenix" },
        ],
    },
    TzGroup {
        region: "Europe",
        zones: &[
            TzChoice { name: "Central European Time", zone: "Europe/Paris" },
            TzChoice { name: "Eastern European Time", zone: "Europe/Helsinki" },
            TzChoice { name: "UK / Ireland Time", zone: "Europe/London" },
            TzChoice { name: "Turkey Time", zone: "Europe/Istanbul" },
        ],
    },
    TzGroup {
        region: "Asia",
        zones: &[
            TzChoice { name: "Japan / Korea Time", zone: "Asia/Tokyo" },
            TzChoice { name: "China / Singapore", zone: "Asia/Shanghai" },
            TzChoice { name: "India Time", zone: "Asia/Kolkata" },
        ],
    },
    TzGroup {
        region: "Australia",
        zones: &[
            TzChoice { name: "Sydney / Melbourne", zone: "Australia/Sydney" },
            TzChoice { name: "Perth Time", zone: "Australia/Perth" },
        ],
    },
    TzGroup {
        region: "Africa",
        zones: &[
            TzChoice { name: "West Africa Time", zone: "Africa/Lagos" },
            TzChoice { name: "Central Africa Time", zone: "Africa/Johannesburg" },
        ],
    },
    TzGroup {
        region: "Pacific",
        zones: &[
            TzChoice { name: "Hawaii Time", zone: "Pacific/Honolulu" },
            TzChoice { name: "Fiji Time", zone: "Pacific/Fiji" },
        ],
    },
];

/// Map a device-reported IANA zone to the closest curated entry.
///
/// An exact match within the device's region wins. Otherwise the first zone
/// of the same region keeps the user in familiar territory (Europe stays
/// Europe, America stays America). Devices outside every curated region keep
/// their own zone unchanged.
#[must_use]
pub fn resolve_time_zone(device: &str) -> String {
    let region = device.split('/').next().unwrap_or(device);
    let Some(group) = TZ_GROUPS.iter().find(|g| g.region == region) else {
        return device.to_string();
    };

    if group.zones.iter().any(|choice| choice.zone == device) {
        return device.to_string();
    }

    group
        .zones
        .first()
        .map_or_else(|| device.to_string(), |choice| choice.zone.to_string())
}
