use crate::registry;

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// Current value of every simulated object, keyed by OID.
///
/// Values are text whatever the object's kind; the poller is told the kind
/// separately.
pub type State = BTreeMap<String, String>;

// Snapshot written when the state file is missing or damaged.
const DEFAULT_STATE: [(&str, &str); 9] = [
    (registry::UPS_BASIC_IDENT_MODEL, "Smart-UPS 3000"),
    (registry::UPS_BASIC_BATTERY_STATUS, "2"), // Battery normal.
    (registry::UPS_BASIC_BATTERY_TIME_ON_BATTERY, "0"),
    (registry::UPS_BASIC_BATTERY_LAST_REPLACE_DATE, "2024-01-24"),
    (registry::UPS_BASIC_INPUT_PHASE, "1"), // Single phase.
    (registry::UPS_BASIC_OUTPUT_STATUS, "2"), // Output normal.
    (registry::UPS_BASIC_OUTPUT_VOLTAGE, "230"),
    (registry::UPS_BASIC_OUTPUT_FREQUENCY, "50"),
    (registry::UPS_BASIC_OUTPUT_LOAD, "45"),
];

pub fn default_state() -> State {
    DEFAULT_STATE
        .iter()
        .map(|&(oid, value)| (oid.to_string(), value.to_string()))
        .collect()
}

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Corrupt(serde_json::Error),
    Incomplete(String),
    Io(io::Error),
}

impl StoreError {
    /// Whether rewriting the defaults can fix this.
    ///
    /// Other I/O failures such as permission errors are left alone.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound | StoreError::Corrupt(_) | StoreError::Incomplete(_)
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "UPS state file does not exist"),
            StoreError::Corrupt(e) => write!(f, "UPS state file is not valid: {}", e),
            StoreError::Incomplete(oid) => write!(f, "UPS state file has no value for {}", oid),
            StoreError::Io(e) => write!(f, "Issue with UPS state file: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> StoreError {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(err)
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> StoreError {
        if err.is_io() {
            StoreError::Io(err.into())
        } else {
            StoreError::Corrupt(err)
        }
    }
}

/// JSON file holding the simulated UPS state between invocations.
///
/// There is no locking. Overlapping invocations race on the file and the last
/// writer wins; the poller is expected to call us one request at a time.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> StateStore {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full state, writing the default snapshot first if the file is
    /// missing or damaged. Only one repair is attempted.
    pub fn load(&self) -> Result<State, StoreError> {
        match self.read() {
            Ok(state) => Ok(state),
            Err(e) if e.is_recoverable() => {
                eprintln!(
                    "Resetting UPS state in {} to defaults: {}.",
                    self.path.display(),
                    e
                );
                self.save(&default_state())?;
                self.read()
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrite the file with `state`.
    pub fn save(&self, state: &State) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn read(&self) -> Result<State, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        // Hand-edited files may hold bare numbers; those are still values.
        let mut state = State::new();
        for (oid, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(StoreError::Corrupt(serde::de::Error::custom(format!(
                        "value for {} is not a scalar: {}",
                        oid, other
                    ))))
                }
            };
            state.insert(oid, text);
        }

        for &(oid, _) in DEFAULT_STATE.iter() {
            if !state.contains_key(oid) {
                return Err(StoreError::Incomplete(oid.to_string()));
            }
        }
        state.retain(|oid, _| DEFAULT_STATE.iter().any(|&(known, _)| known == oid));

        if cfg!(debug_assertions) {
            eprintln!("Loaded {} values from {}.", state.len(), self.path.display());
        }

        Ok(state)
    }
}
