use crate::registry::{Registry, ValueKind};
use crate::store::{StateStore, StoreError};

use std::io::{self, Write};

/// One pass-through request, as decoded from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Ping,
    Get(String),
    GetNext(String),
    Set {
        oid: String,
        value_type: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: String,
    pub kind: ValueKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Pong,
    Value(VarBind),
    NoSuchObject,
    EndOfMib,
    /// Writes are accepted and dropped; the simulated device is read-only.
    SetIgnored,
}

impl Response {
    /// Print the reply in the format snmpd's `pass` directive reads.
    ///
    /// Misses and ignored writes print nothing.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Response::Pong => writeln!(out, "1"),
            Response::Value(vb) => {
                writeln!(out, "{}", vb.oid)?;
                writeln!(out, "{}", vb.kind)?;
                writeln!(out, "{}", vb.value)
            }
            Response::NoSuchObject | Response::EndOfMib | Response::SetIgnored => Ok(()),
        }
    }
}

pub struct Agent<'a> {
    registry: &'a Registry,
    store: &'a StateStore,
}

impl<'a> Agent<'a> {
    pub fn new(registry: &'a Registry, store: &'a StateStore) -> Agent<'a> {
        Agent { registry, store }
    }

    pub fn handle(&self, request: &Request) -> Result<Response, StoreError> {
        if cfg!(debug_assertions) {
            eprintln!("{:?}", request);
        }

        match request {
            Request::Ping => Ok(Response::Pong),
            Request::Get(oid) => self.get(oid),
            Request::GetNext(oid) => self.get_next(oid),
            Request::Set { .. } => Ok(Response::SetIgnored),
        }
    }

    fn get(&self, oid: &str) -> Result<Response, StoreError> {
        if cfg!(debug_assertions) {
            match self.registry.name(oid) {
                Some(name) => eprintln!("GET {} ({}).", oid, name),
                None => eprintln!("{} is not a UPS object.", oid),
            }
        }

        let state = self.store.load()?;
        Ok(match state.get(oid) {
            Some(value) => Response::Value(VarBind {
                oid: oid.to_string(),
                kind: self.registry.kind(oid),
                value: value.clone(),
            }),
            None => Response::NoSuchObject,
        })
    }

    fn get_next(&self, oid: &str) -> Result<Response, StoreError> {
        // The store is only touched once we know there is something to return.
        let entry = match self.registry.next(oid) {
            Some(entry) => entry,
            None => return Ok(Response::EndOfMib),
        };
        if cfg!(debug_assertions) {
            let known = if self.registry.contains(oid) { "" } else { "unknown " };
            eprintln!("Next after {}{} is {} ({}).", known, oid, entry.oid, entry.name);
        }

        let state = self.store.load()?;
        Ok(match state.get(entry.oid) {
            Some(value) => Response::Value(VarBind {
                oid: entry.oid.to_string(),
                kind: entry.kind,
                value: value.clone(),
            }),
            None => Response::EndOfMib,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use crate::store::default_state;

    use std::fs;

    fn scratch() -> (tempfile::TempDir, Registry, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("ups_state.json"));
        (dir, Registry::new(), store)
    }

    fn render(response: &Response) -> String {
        let mut out = Vec::new();
        response.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn ping_prints_one_without_touching_state() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);

        let response = agent.handle(&Request::Ping).unwrap();
        assert_eq!(render(&response), "1\n");
        assert!(!store.path().exists());
    }

    #[test]
    fn get_known_oid() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);

        let response = agent
            .handle(&Request::Get(registry::UPS_BASIC_OUTPUT_VOLTAGE.to_string()))
            .unwrap();
        assert_eq!(
            render(&response),
            ".1.3.6.1.4.1.318.1.1.1.4.1.2.0\ninteger\n230\n"
        );

        let response = agent
            .handle(&Request::Get(registry::UPS_BASIC_IDENT_MODEL.to_string()))
            .unwrap();
        assert_eq!(
            render(&response),
            ".1.3.6.1.4.1.318.1.1.1.1.1.1.0\nstring\nSmart-UPS 3000\n"
        );
    }

    #[test]
    fn get_reads_persisted_value() {
        let (_dir, registry, store) = scratch();
        let mut state = default_state();
        state.insert(registry::UPS_BASIC_OUTPUT_LOAD.to_string(), "91".to_string());
        store.save(&state).unwrap();

        let response = Agent::new(&registry, &store)
            .handle(&Request::Get(registry::UPS_BASIC_OUTPUT_LOAD.to_string()))
            .unwrap();
        assert_eq!(
            response,
            Response::Value(VarBind {
                oid: registry::UPS_BASIC_OUTPUT_LOAD.to_string(),
                kind: ValueKind::Integer,
                value: "91".to_string(),
            })
        );
    }

    #[test]
    fn get_unknown_oid_is_silent() {
        let (_dir, registry, store) = scratch();
        let response = Agent::new(&registry, &store)
            .handle(&Request::Get(".1.3.6.1.2.1.1.1.0".to_string()))
            .unwrap();
        assert_eq!(response, Response::NoSuchObject);
        assert_eq!(render(&response), "");
    }

    #[test]
    fn walk_visits_every_oid_once_in_order() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);

        let first = registry.entries()[0].oid;
        let mut visited = vec![first.to_string()];
        loop {
            let current = visited.last().unwrap().clone();
            match agent.handle(&Request::GetNext(current)).unwrap() {
                Response::Value(vb) => visited.push(vb.oid),
                Response::EndOfMib => break,
                other => panic!("unexpected response {:?}", other),
            }
        }

        let expected: Vec<String> = registry
            .entries()
            .iter()
            .map(|e| e.oid.to_string())
            .collect();
        assert_eq!(visited, expected);
        assert!(visited.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn get_next_from_unknown_oid() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);

        let response = agent
            .handle(&Request::GetNext(".1.3.6.1.4.1.318.1.1.1.4".to_string()))
            .unwrap();
        assert_eq!(
            render(&response),
            ".1.3.6.1.4.1.318.1.1.1.4.1.1.0\ninteger\n2\n"
        );

        let response = agent
            .handle(&Request::GetNext(".1.3.6.1".to_string()))
            .unwrap();
        assert_eq!(
            render(&response),
            ".1.3.6.1.4.1.318.1.1.1.1.1.1.0\nstring\nSmart-UPS 3000\n"
        );
    }

    #[test]
    fn get_next_past_the_end_is_silent() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);

        let response = agent
            .handle(&Request::GetNext(registry::UPS_BASIC_OUTPUT_LOAD.to_string()))
            .unwrap();
        assert_eq!(response, Response::EndOfMib);
        assert_eq!(render(&response), "");
        assert!(!store.path().exists());
    }

    #[test]
    fn set_leaves_state_untouched() {
        let (_dir, registry, store) = scratch();
        let agent = Agent::new(&registry, &store);
        store.load().unwrap();
        let before = fs::read(store.path()).unwrap();

        let response = agent
            .handle(&Request::Set {
                oid: registry::UPS_BASIC_OUTPUT_VOLTAGE.to_string(),
                value_type: "integer".to_string(),
                value: "120".to_string(),
            })
            .unwrap();
        assert_eq!(response, Response::SetIgnored);
        assert_eq!(render(&response), "");
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn set_does_not_create_state() {
        let (_dir, registry, store) = scratch();
        let response = Agent::new(&registry, &store)
            .handle(&Request::Set {
                oid: registry::UPS_BASIC_OUTPUT_LOAD.to_string(),
                value_type: "integer".to_string(),
                value: "-1".to_string(),
            })
            .unwrap();
        assert_eq!(response, Response::SetIgnored);
        assert!(!store.path().exists());
    }

    #[test]
    fn storage_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::new();
        let store = StateStore::new(dir.path());

        let result = Agent::new(&registry, &store)
            .handle(&Request::Get(registry::UPS_BASIC_OUTPUT_VOLTAGE.to_string()));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
