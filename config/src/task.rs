// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime timeline tasks

use crate::pipeline::{Server, User};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Arguments of a handover task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverArgs {
    #[serde(alias = "user-teid")]
    pub user_teid: u32,
    /// how many base stations to move forward, wrapping around
    #[serde(alias = "bst-shift")]
    pub bst_shift: i64,
}

/// A flow table edit, interpreted by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEdit {
    pub cmd: String,
    pub table: serde_json::Value,
    #[serde(default)]
    pub entry: serde_json::Value,
}

/// The table family a [`TableEdit`] applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    Table,
    L3Table,
    GroupTable,
}

impl Display for TableAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableAction::Table => write!(f, "mod_table"),
            TableAction::L3Table => write!(f, "mod_l3_table"),
            TableAction::GroupTable => write!(f, "mod_group_table"),
        }
    }
}

/// One entry of the runtime timeline. The `action` key selects the variant; an unknown
/// action fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Task {
    AddUser { args: User },
    DelUser { args: User },
    AddServer { args: Server },
    DelServer { args: Server },
    Handover { args: HandoverArgs },
    #[serde(rename = "mod_table")]
    ModifyTable(TableEdit),
    #[serde(rename = "mod_l3_table")]
    ModifyL3Table(TableEdit),
    #[serde(rename = "mod_group_table")]
    ModifyGroupTable(TableEdit),
}

impl Task {
    /// The action name, as spelled in pipeline specs
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Task::AddUser { .. } => "add_user",
            Task::DelUser { .. } => "del_user",
            Task::AddServer { .. } => "add_server",
            Task::DelServer { .. } => "del_server",
            Task::Handover { .. } => "handover",
            Task::ModifyTable(_) => "mod_table",
            Task::ModifyL3Table(_) => "mod_l3_table",
            Task::ModifyGroupTable(_) => "mod_group_table",
        }
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::AddUser { args } | Task::DelUser { args } => {
                write!(f, "{} teid={} ip={}", self.action(), args.teid, args.ip)
            }
            Task::AddServer { args } | Task::DelServer { args } => {
                write!(f, "{} {args}", self.action())
            }
            Task::Handover { args } => write!(
                f,
                "handover teid={} shift={}",
                args.user_teid, args.bst_shift
            ),
            Task::ModifyTable(edit) | Task::ModifyL3Table(edit) | Task::ModifyGroupTable(edit) => {
                write!(f, "{} {} table={}", self.action(), edit.cmd, edit.table)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_table_edits() {
        let task: Task = serde_json::from_value(json!({
            "action": "mod_l3_table",
            "cmd": "add",
            "table": "l3",
            "entry": {"ip": "10.0.0.0", "prefix_len": 8}
        }))
        .unwrap();
        let Task::ModifyL3Table(edit) = &task else {
            panic!("wrong task {task:?}");
        };
        assert_eq!(edit.cmd, "add");
        assert_eq!(edit.table, json!("l3"));
        assert_eq!(task.action(), "mod_l3_table");
    }

    #[test]
    fn parse_server_task() {
        let task: Task = serde_json::from_value(json!({
            "action": "del_server",
            "args": {"ip": "2.0.0.0", "prefix_len": 24, "nhop": 0}
        }))
        .unwrap();
        assert_eq!(task.to_string(), "del_server 2.0.0.0/24");
    }

    #[test]
    fn unknown_action_is_an_error() {
        let err = serde_json::from_value::<Task>(json!({"action": "teleport", "args": {}}))
            .unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn negative_shift() {
        let task: Task = serde_json::from_value(json!({
            "action": "handover",
            "args": {"user_teid": 4, "bst_shift": -1}
        }))
        .unwrap();
        assert_eq!(task.to_string(), "handover teid=4 shift=-1");
    }
}
