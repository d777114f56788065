mod agent;
mod cli;
mod registry;
mod store;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::exit,
};

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Where the simulated UPS keeps its values between invocations.
const STATE_FILE: &str = "/var/lib/snmp/ups_state.json";

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct Settings {
    state_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            state_file: PathBuf::from(STATE_FILE),
        }
    }
}

fn figment(config: &Path) -> Figment {
    Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(config))
        .merge(Env::prefixed("UPS_AGENT_"))
}

fn main() {
    let args = cli::Args::parse();

    let settings: Settings = match figment(&args.config).extract() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to read agent config: {}", e);
            exit(1)
        }
    };

    let registry = registry::Registry::new();

    if cfg!(debug_assertions) {
        eprintln!("{:#?}", settings);
        eprintln!("{:#?}", registry.entries());
    }

    let store = store::StateStore::new(settings.state_file);
    let agent = agent::Agent::new(&registry, &store);

    let response = match agent.handle(&args.request()) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("{} ({}).", e, store.path().display());
            exit(1)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = response.write_to(&mut out).and_then(|_| out.flush()) {
        eprintln!("Failed to write response: {}", e);
        exit(1)
    }
}
