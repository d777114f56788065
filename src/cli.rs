use crate::agent::Request;

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "/etc/snmp/ups-agent.toml";

/// Pass-through sub-agent simulating an APC UPS for snmpd.
///
/// Invoked once per request by snmpd's `pass` directive. With no operation
/// flag it answers the liveness ping. Unrecognised arguments are a usage
/// error rather than a ping.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// GET the value of OID.
    #[clap(short = 'g', value_name = "OID", conflicts_with_all = &["next", "set"])]
    pub get: Option<String>,

    /// GET-NEXT: the first object after OID.
    #[clap(short = 'n', value_name = "OID", conflicts_with = "set")]
    pub next: Option<String>,

    /// SET OID of TYPE to VALUE. Accepted but ignored.
    #[clap(
        short = 's',
        number_of_values = 3,
        value_names = &["OID", "TYPE", "VALUE"],
        allow_hyphen_values = true
    )]
    pub set: Option<Vec<String>>,

    /// Settings file.
    #[clap(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

impl Args {
    pub fn request(&self) -> Request {
        if let Some(oid) = &self.get {
            return Request::Get(oid.clone());
        }
        if let Some(oid) = &self.next {
            return Request::GetNext(oid.clone());
        }
        if let Some(set) = &self.set {
            if let [oid, value_type, value, ..] = set.as_slice() {
                return Request::Set {
                    oid: oid.clone(),
                    value_type: value_type.clone(),
                    value: value.clone(),
                };
            }
        }
        Request::Ping
    }
}
