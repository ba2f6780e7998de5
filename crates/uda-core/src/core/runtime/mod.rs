pub mod effects;
pub mod process;

use serde_json::{json, Value};
use strum::Display;

use crate::core::config::context::CommandInfo;
use crate::core::tooling::{CommandStatus, ExecutionOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CommandGroup {
    Create,
    List,
    Remove,
    Activate,
    Deactivate,
    Init,
    Install,
    Run,
    #[strum(serialize = "self")]
    SelfManage,
    Mirror,
}

pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(info, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let group_name = info.group.to_string();
    let prefix = if group_name == info.name {
        format!("uda {}", info.name)
    } else {
        format!("uda {} {}", group_name, info.name)
    };
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
