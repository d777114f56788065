use std::fmt;

// Objects live under the APC PowerNet MIB enterprise arc.
macro_rules! apc_oid {
    ($suffix:literal) => {
        concat!(".1.3.6.1.4.1.318", $suffix)
    };
}

pub const UPS_BASIC_IDENT_MODEL: &str = apc_oid!(".1.1.1.1.1.1.0");
pub const UPS_BASIC_BATTERY_STATUS: &str = apc_oid!(".1.1.1.2.1.1.0");
pub const UPS_BASIC_BATTERY_TIME_ON_BATTERY: &str = apc_oid!(".1.1.1.2.1.2.0");
pub const UPS_BASIC_BATTERY_LAST_REPLACE_DATE: &str = apc_oid!(".1.1.1.2.1.3.0");
pub const UPS_BASIC_INPUT_PHASE: &str = apc_oid!(".1.1.1.3.1.1.0");
pub const UPS_BASIC_OUTPUT_STATUS: &str = apc_oid!(".1.1.1.4.1.1.0");
pub const UPS_BASIC_OUTPUT_VOLTAGE: &str = apc_oid!(".1.1.1.4.1.2.0");
pub const UPS_BASIC_OUTPUT_FREQUENCY: &str = apc_oid!(".1.1.1.4.1.3.0");
pub const UPS_BASIC_OUTPUT_LOAD: &str = apc_oid!(".1.1.1.4.1.4.0");

// Attributes reported to the poller as integers. Everything else is a string.
const INTEGER_OIDS: [&str; 7] = [
    UPS_BASIC_BATTERY_STATUS,
    UPS_BASIC_BATTERY_TIME_ON_BATTERY,
    UPS_BASIC_INPUT_PHASE,
    UPS_BASIC_OUTPUT_STATUS,
    UPS_BASIC_OUTPUT_VOLTAGE,
    UPS_BASIC_OUTPUT_FREQUENCY,
    UPS_BASIC_OUTPUT_LOAD,
];

const OBJECTS: [(&str, &str); 9] = [
    (UPS_BASIC_IDENT_MODEL, "upsBasicIdentModel"),
    (UPS_BASIC_BATTERY_STATUS, "upsBasicBatteryStatus"),
    (UPS_BASIC_BATTERY_TIME_ON_BATTERY, "upsBasicBatteryTimeOnBattery"),
    (UPS_BASIC_BATTERY_LAST_REPLACE_DATE, "upsBasicBatteryLastReplaceDate"),
    (UPS_BASIC_INPUT_PHASE, "upsBasicInputPhase"),
    (UPS_BASIC_OUTPUT_STATUS, "upsBasicOutputStatus"),
    (UPS_BASIC_OUTPUT_VOLTAGE, "upsBasicOutputVoltage"),
    (UPS_BASIC_OUTPUT_FREQUENCY, "upsBasicOutputFrequency"),
    (UPS_BASIC_OUTPUT_LOAD, "upsBasicOutputLoad"),
];

/// The type token net-snmp expects on the second line of a pass-through reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    String,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::String => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub oid: &'static str,
    pub name: &'static str,
    pub kind: ValueKind,
}

/// Fixed catalogue of simulated UPS objects.
///
/// Entries are kept sorted by plain string comparison of the dotted OID, not
/// by numeric arc comparison. The two agree for the current table since every
/// OID has the same arc count and single-digit arcs past the prefix; adding
/// OIDs that break that would change the walk order seen by the poller.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Registry {
        let mut entries: Vec<Entry> = OBJECTS
            .iter()
            .map(|&(oid, name)| Entry {
                oid,
                name,
                kind: classify(oid),
            })
            .collect();
        entries.sort_by(|a, b| a.oid.cmp(b.oid));

        Registry { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, oid: &str) -> Option<&Entry> {
        self.entries
            .binary_search_by(|e| e.oid.cmp(oid))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.get(oid).is_some()
    }

    /// Value kind of a known OID. Unknown OIDs classify as strings.
    pub fn kind(&self, oid: &str) -> ValueKind {
        self.get(oid).map_or(ValueKind::String, |e| e.kind)
    }

    pub fn name(&self, oid: &str) -> Option<&'static str> {
        self.get(oid).map(|e| e.name)
    }

    /// The known OID following `oid` in walk order.
    ///
    /// A known OID steps to its successor; an unknown one jumps to the first
    /// known OID that compares greater. `None` once the table is exhausted.
    pub fn next(&self, oid: &str) -> Option<&Entry> {
        let idx = match self.entries.binary_search_by(|e| e.oid.cmp(oid)) {
            Ok(i) => i + 1,
            Err(i) => i,
        };
        self.entries.get(idx)
    }
}

fn classify(oid: &str) -> ValueKind {
    if INTEGER_OIDS.contains(&oid) {
        ValueKind::Integer
    } else {
        ValueKind::String
    }
}
