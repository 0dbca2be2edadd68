use serde::{Deserialize, Serialize};

use crate::account::AccountAddress;

/// One entry of an account's on-chain todo list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub address: AccountAddress,

    #[serde(default)]
    pub completed: bool,

    pub content: String,

    #[serde(with = "u64_string")]
    pub task_id: u64,
}

/// Handle of the keyed table that stores the tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRef {
    pub handle: String,
}

/// The `TodoList` resource published under the owning account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoListResource {
    pub tasks: TableRef,

    #[serde(with = "u64_string")]
    pub task_counter: u64,
}

impl TodoListResource {
    /// Task ids currently allocated, in order.
    pub fn task_ids(&self) -> std::ops::RangeInclusive<u64> {
        1..=self.task_counter
    }
}

/// Move `u64` values travel as decimal strings in JSON. Plain numbers
/// are accepted on input too.
pub mod u64_string {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct U64Visitor;

        impl Visitor<'_> for U64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a u64 as a decimal string or number")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| E::custom(format!("invalid u64 {v:?}: {e}")))
            }
        }

        deserializer.deserialize_any(U64Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Task, TodoListResource};

    #[test]
    fn decodes_task_table_value() {
        let task: Task = serde_json::from_value(json!({
            "address": "0xA1",
            "completed": false,
            "content": "Buy milk",
            "task_id": "7"
        }))
        .unwrap();

        assert_eq!(task.task_id, 7);
        assert_eq!(task.address.as_str(), "0xa1");
        assert!(!task.completed);
    }

    #[test]
    fn decodes_resource_and_ignores_event_handles() {
        let resource: TodoListResource = serde_json::from_value(json!({
            "set_task_event": { "counter": "3", "guid": { "id": { "addr": "0x1", "creation_num": "4" } } },
            "task_counter": "3",
            "tasks": { "handle": "0xfeed" }
        }))
        .unwrap();

        assert_eq!(resource.tasks.handle, "0xfeed");
        assert_eq!(resource.task_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_counter_yields_no_ids() {
        let resource: TodoListResource = serde_json::from_value(json!({
            "task_counter": 0,
            "tasks": { "handle": "0x1" }
        }))
        .unwrap();
        assert_eq!(resource.task_ids().count(), 0);
    }

    #[test]
    fn rejects_non_numeric_task_id() {
        let err = serde_json::from_value::<Task>(json!({
            "address": "0x1",
            "completed": true,
            "content": "x",
            "task_id": "seven"
        }));
        assert!(err.is_err());
    }
}
