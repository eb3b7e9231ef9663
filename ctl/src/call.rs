// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Description of a control-plane call, independent of its encoding

use std::fmt::Display;

/// What a call does to the entity it addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Add,
    Del,
    Set,
    Show,
    Attach,
}

impl Verb {
    /// The verb that undoes this one, if any
    #[must_use]
    pub fn inverse(self) -> Option<Verb> {
        match self {
            Verb::Add => Some(Verb::Del),
            Verb::Del => Some(Verb::Add),
            Verb::Set | Verb::Show | Verb::Attach => None,
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::Add => write!(f, "add"),
            Verb::Del => write!(f, "del"),
            Verb::Set => write!(f, "set"),
            Verb::Show => write!(f, "show"),
            Verb::Attach => write!(f, "attach"),
        }
    }
}

/// Data carried by a call
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// named fields of a single entity, in the order given
    Fields(Vec<(String, String)>),
    /// a list of entity records, submitted at once
    Batch(Vec<serde_json::Value>),
}

/// A single control-plane call.
///
/// The entity is addressed by a `path` (e.g. `r1 route`) and optional `keys` that identify one
/// element of it (e.g. a prefix and a next hop), which is how the daemon names its resources in
/// both the command line and the REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct CtlCall {
    path: Vec<String>,
    verb: Verb,
    keys: Vec<String>,
    payload: Payload,
}

impl CtlCall {
    #[must_use]
    pub fn new<I, S>(path: I, verb: Verb) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            verb,
            keys: Vec::new(),
            payload: Payload::Fields(Vec::new()),
        }
    }

    /// A call submitting many records to the entity collection at `path`
    #[must_use]
    pub fn batch<I, S>(path: I, verb: Verb, records: Vec<serde_json::Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            payload: Payload::Batch(records),
            ..Self::new(path, verb)
        }
    }

    #[must_use]
    pub fn key(mut self, key: impl ToString) -> Self {
        self.keys.push(key.to_string());
        self
    }

    /// Add a named field. Fields are ignored on batch calls.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl ToString) -> Self {
        if let Payload::Fields(fields) = &mut self.payload {
            fields.push((name.to_owned(), value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self.payload, Payload::Batch(_))
    }

    /// Command-line arguments for this call: `<path..> <verb> <keys..> <name=value..>`
    #[must_use]
    pub fn cli_args(&self) -> Vec<String> {
        let mut args = self.path.clone();
        args.push(self.verb.to_string());
        args.extend(self.keys.iter().cloned());
        if let Payload::Fields(fields) = &self.payload {
            args.extend(fields.iter().map(|(name, value)| format!("{name}={value}")));
        }
        args
    }
}

impl Display for CtlCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Payload::Fields(_) => write!(f, "{}", self.cli_args().join(" ")),
            Payload::Batch(records) => write!(
                f,
                "{} {} [{} records]",
                self.path.join(" "),
                self.verb,
                records.len()
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn render_cli_args() {
        let call = CtlCall::new(["c1", "traffic-class"], Verb::Add)
            .key(7)
            .field("priority", 0)
            .field("dstip", "3.0.0.1/32");
        assert_eq!(
            call.cli_args(),
            vec!["c1", "traffic-class", "add", "7", "priority=0", "dstip=3.0.0.1/32"]
        );
        assert_eq!(call.to_string(), "c1 traffic-class add 7 priority=0 dstip=3.0.0.1/32");
        assert!(!call.is_batch());
    }

    #[test]
    fn batch_ignores_fields() {
        let call = CtlCall::batch(
            ["r1", "arp-table"],
            Verb::Add,
            vec![json!({"address": "1.1.0.1"}), json!({"address": "1.1.0.2"})],
        )
        .field("ignored", 1);
        assert!(call.is_batch());
        assert_eq!(call.to_string(), "r1 arp-table add [2 records]");
        assert_eq!(call.cli_args(), vec!["r1", "arp-table", "add"]);
    }

    #[test]
    fn inverse_verbs() {
        assert_eq!(Verb::Add.inverse(), Some(Verb::Del));
        assert_eq!(Verb::Del.inverse(), Some(Verb::Add));
        assert_eq!(Verb::Set.inverse(), None);
    }
}
